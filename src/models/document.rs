//! In-memory request document
//!
//! The variable table is owned once here. Requests reach it through the
//! document rather than carrying their own copies, so every request of one
//! parse sees the same values.

use uuid::Uuid;

use crate::devexp::curl::build_pre_auth_curl;
use crate::models::request::{PreAuthConfig, Request};
use crate::models::variables::VariableTable;

/// Ordered requests plus the document-global state they share
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    pub requests: Vec<Request>,
    pub variables: VariableTable,
    /// Live bootstrap configuration, edited before it is saved back
    pub pre_auth: Option<PreAuthConfig>,
}

impl Document {
    pub fn new(requests: Vec<Request>, variables: VariableTable) -> Self {
        let mut document = Self {
            requests,
            variables,
            pre_auth: None,
        };
        document.hydrate_pre_auth();
        document
    }

    pub fn variables(&self) -> &VariableTable {
        &self.variables
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn find(&self, id: Uuid) -> Option<&Request> {
        self.requests.iter().find(|r| r.id == id)
    }

    pub fn find_mut(&mut self, id: Uuid) -> Option<&mut Request> {
        self.requests.iter_mut().find(|r| r.id == id)
    }

    /// The authentication bootstrap request, if the document has one
    pub fn pre_auth_request(&self) -> Option<&Request> {
        self.requests.iter().find(|r| r.is_bootstrap())
    }

    pub fn pre_auth_request_mut(&mut self) -> Option<&mut Request> {
        self.requests.iter_mut().find(|r| r.is_bootstrap())
    }

    pub fn current_pre_auth(&self) -> Option<&PreAuthConfig> {
        self.pre_auth.as_ref()
    }

    pub fn current_pre_auth_mut(&mut self) -> Option<&mut PreAuthConfig> {
        self.pre_auth.as_mut()
    }

    /// Rebuild the live bootstrap config from the bootstrap request.
    ///
    /// Literal credentials already entered in the live config survive.
    pub fn hydrate_pre_auth(&mut self) {
        let Some(request) = self.pre_auth_request() else {
            self.pre_auth = None;
            return;
        };

        let curl_command = build_pre_auth_curl(request);
        let response_path = request
            .pre_auth
            .as_ref()
            .map(|p| p.response_path.clone())
            .unwrap_or_default();

        let (username, password) = self
            .pre_auth
            .take()
            .map(|p| (p.username, p.password))
            .unwrap_or_default();

        self.pre_auth = Some(PreAuthConfig {
            enabled: true,
            curl_command,
            response_path,
            username,
            password,
        });
    }

    /// Copy persistable parts of the live config back onto the bootstrap request.
    ///
    /// Credentials stay in the live config only.
    pub fn sync_pre_auth(&mut self) {
        let Some(live) = self.pre_auth.clone() else {
            return;
        };
        if let Some(request) = self.pre_auth_request_mut() {
            let stored = request.pre_auth.get_or_insert_with(PreAuthConfig::seeded);
            stored.enabled = live.enabled;
            stored.response_path = live.response_path;
            stored.curl_command = live.curl_command;
            stored.username = None;
            stored.password = None;
            request.is_pre_auth_request = true;
        }
    }

    /// Append imported requests; the variable table is left as is
    pub fn merge_imported(&mut self, requests: Vec<Request>) {
        self.requests.extend(requests);
        if self.pre_auth.is_none() {
            self.hydrate_pre_auth();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::Method;

    fn bootstrap() -> Request {
        let mut request = Request::new(Method::Post, "https://auth.example.com/login");
        request.name = "@PRE-AUTH".to_string();
        request.is_pre_auth_request = true;
        request.body = r#"{"username":"bob","password":"secret"}"#.to_string();
        request.pre_auth = Some(PreAuthConfig {
            response_path: "data.token".to_string(),
            ..PreAuthConfig::seeded()
        });
        request
    }

    #[test]
    fn test_hydrate_builds_live_config() {
        let document = Document::new(vec![bootstrap()], VariableTable::new());
        let live = document.current_pre_auth().unwrap();

        assert!(live.enabled);
        assert_eq!(live.response_path, "data.token");
        assert!(live.curl_command.contains("{{username}}"));
        assert!(live.curl_command.contains("{{password}}"));
        assert!(!live.curl_command.contains("secret"));
    }

    #[test]
    fn test_no_bootstrap_no_live_config() {
        let document = Document::new(
            vec![Request::new(Method::Get, "https://x/y")],
            VariableTable::new(),
        );
        assert!(document.current_pre_auth().is_none());
    }

    #[test]
    fn test_sync_drops_credentials() {
        let mut document = Document::new(vec![bootstrap()], VariableTable::new());
        if let Some(live) = document.current_pre_auth_mut() {
            live.response_path = "token".to_string();
            live.password = Some("hunter2".to_string());
        }
        document.sync_pre_auth();

        let stored = document.pre_auth_request().unwrap().pre_auth.clone().unwrap();
        assert_eq!(stored.response_path, "token");
        assert_eq!(stored.password, None);
    }

    #[test]
    fn test_merge_imported_keeps_variables() {
        let variables: VariableTable = vec![("host", "https://x")].into_iter().collect();
        let mut document = Document::new(vec![], variables.clone());
        document.merge_imported(vec![Request::new(Method::Get, "{{host}}/a")]);

        assert_eq!(document.len(), 1);
        assert_eq!(document.variables(), &variables);
    }
}
