//! ConfigSets API (`/solr/admin/configs`).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{action, AdminApi, SolrApi};
use crate::http::HttpRequest;
use crate::options::OutputOptions;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateConfigSetOptions {
    /// Sent as `configSetProp.<key>=<value>`, in key order.
    pub properties: BTreeMap<String, String>,
    pub output: OutputOptions,
}

impl SolrApi {
    pub fn build_configset_create(
        &self,
        name: &str,
        base_configset: &str,
        options: &CreateConfigSetOptions,
    ) -> HttpRequest {
        let mut params = action("CREATE");
        params.push("name", name).push("baseConfigSet", base_configset);
        for (key, value) in &options.properties {
            params.push(format!("configSetProp.{key}"), value);
        }
        options.output.apply(&mut params);
        self.admin_post(AdminApi::Configs, &params)
    }

    pub fn build_configset_delete(&self, name: &str, output: OutputOptions) -> HttpRequest {
        let mut params = action("DELETE");
        params.push("name", name);
        output.apply(&mut params);
        self.admin_post(AdminApi::Configs, &params)
    }

    pub fn build_configset_list(&self, output: OutputOptions) -> HttpRequest {
        let mut params = action("LIST");
        output.apply(&mut params);
        self.admin_get(AdminApi::Configs, &params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpMethod;

    const BASE: &str = "http://localhost:8983/solr/admin/configs";

    #[test]
    fn create_names_base_configset() {
        let req = SolrApi::default().build_configset_create(
            "myconf",
            "_default",
            &CreateConfigSetOptions::default(),
        );
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(
            req.url,
            format!("{BASE}?action=CREATE&name=myconf&baseConfigSet=_default&wt=json&indent=off")
        );
    }

    #[test]
    fn create_forwards_properties() {
        let mut options = CreateConfigSetOptions::default();
        options.properties.insert("immutable".to_string(), "false".to_string());
        let req = SolrApi::default().build_configset_create("myconf", "_default", &options);
        assert_eq!(
            req.url,
            format!(
                "{BASE}?action=CREATE&name=myconf&baseConfigSet=_default&configSetProp.immutable=false&wt=json&indent=off"
            )
        );
    }

    #[test]
    fn delete_and_list() {
        let api = SolrApi::default();
        let delete = api.build_configset_delete("myconf", OutputOptions::default());
        assert_eq!(delete.method, HttpMethod::Post);
        assert_eq!(delete.url, format!("{BASE}?action=DELETE&name=myconf&wt=json&indent=off"));

        let list = api.build_configset_list(OutputOptions::default());
        assert_eq!(list.method, HttpMethod::Get);
        assert_eq!(list.url, format!("{BASE}?action=LIST&wt=json&indent=off"));
    }
}
