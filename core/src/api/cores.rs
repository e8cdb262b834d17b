//! CoreAdmin API (`/solr/admin/cores`).

use serde::{Deserialize, Serialize};

use super::{action, AdminApi, SolrApi};
use crate::http::HttpRequest;
use crate::options::OutputOptions;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateCoreOptions {
    pub instance_dir: Option<String>,
    pub config: Option<String>,
    pub schema: Option<String>,
    pub data_dir: Option<String>,
    pub config_set: Option<String>,
    pub output: OutputOptions,
}

/// What `UNLOAD` removes from disk besides the core registration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnloadCoreOptions {
    pub delete_index: bool,
    pub delete_data_dir: bool,
    pub delete_instance_dir: bool,
    pub output: OutputOptions,
}

impl SolrApi {
    /// Status of every core, or of `core` alone.
    pub fn build_core_status(&self, core: Option<&str>, output: OutputOptions) -> HttpRequest {
        let mut params = action("STATUS");
        params.push_opt("core", core);
        output.apply(&mut params);
        self.admin_get(AdminApi::Cores, &params)
    }

    pub fn build_core_create(&self, name: &str, options: &CreateCoreOptions) -> HttpRequest {
        let mut params = action("CREATE");
        params
            .push("name", name)
            .push_opt("instanceDir", options.instance_dir.as_deref())
            .push_opt("config", options.config.as_deref())
            .push_opt("schema", options.schema.as_deref())
            .push_opt("dataDir", options.data_dir.as_deref())
            .push_opt("configSet", options.config_set.as_deref());
        options.output.apply(&mut params);
        self.admin_post(AdminApi::Cores, &params)
    }

    pub fn build_core_reload(&self, core: &str, output: OutputOptions) -> HttpRequest {
        let mut params = action("RELOAD");
        params.push("core", core);
        output.apply(&mut params);
        self.admin_post(AdminApi::Cores, &params)
    }

    pub fn build_core_rename(&self, core: &str, other: &str, output: OutputOptions) -> HttpRequest {
        let mut params = action("RENAME");
        params.push("core", core).push("other", other);
        output.apply(&mut params);
        self.admin_post(AdminApi::Cores, &params)
    }

    pub fn build_core_swap(&self, core: &str, other: &str, output: OutputOptions) -> HttpRequest {
        let mut params = action("SWAP");
        params.push("core", core).push("other", other);
        output.apply(&mut params);
        self.admin_get(AdminApi::Cores, &params)
    }

    /// Delete flags are only sent when set.
    pub fn build_core_unload(&self, core: &str, options: &UnloadCoreOptions) -> HttpRequest {
        let mut params = action("UNLOAD");
        params
            .push("core", core)
            .push_opt("deleteIndex", options.delete_index.then_some(true))
            .push_opt("deleteDataDir", options.delete_data_dir.then_some(true))
            .push_opt("deleteInstanceDir", options.delete_instance_dir.then_some(true));
        options.output.apply(&mut params);
        self.admin_get(AdminApi::Cores, &params)
    }
}
