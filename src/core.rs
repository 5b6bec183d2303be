use std::io::Read as _;
use std::path::Path;
use std::time::Duration;

use clap::Parser;
use console::style;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::cli::Args;
use crate::client::{ClientOptions, HttpClient, HttpResponse};
use crate::config::{Config, EXAMPLE_CONFIG, LOCAL_CONFIG_FILE};
use crate::context::Environment;
use crate::devexp::curl::build_curl;
use crate::devexp::http_file::{list_requests, parse_http_file, save_http_file};
use crate::devexp::import::import_requests;
use crate::devexp::variables::{count_usages, undefined_variables, VariableScope};
use crate::errors::{RestbookError, Result};
use crate::logging;
use crate::models::{Document, Request, VariableTable};
use crate::preauth::{execute_pre_auth, AUTH_VARIABLE};
use crate::signals;
use crate::status::ExitStatus;

/// Main entry point for the CLI.
///
/// Parses arguments, installs logging and drives [`program`] on a tokio
/// runtime.
pub fn run(args: Vec<String>, mut env: Environment) -> ExitStatus {
    if let Some(name) = args.first() {
        if let Some(basename) = Path::new(name).file_stem() {
            env.program_name = basename.to_string_lossy().to_string();
        }
    }

    let traceback = args.iter().any(|a| a == "--traceback");

    let parsed = match Args::try_parse_from(&args) {
        Ok(args) => args,
        Err(e) => {
            e.print().ok();
            return if e.kind() == clap::error::ErrorKind::DisplayHelp
                || e.kind() == clap::error::ErrorKind::DisplayVersion
            {
                ExitStatus::Success
            } else {
                ExitStatus::Error
            };
        }
    };

    // A subscriber may already be installed when embedded
    logging::init(parsed.verbose, parsed.log_format).ok();

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => return handle_error(e.into(), traceback),
    };

    match runtime.block_on(program(parsed, env)) {
        Ok(status) => status,
        Err(e) => handle_error(e, traceback),
    }
}

pub async fn program(args: Args, env: Environment) -> Result<ExitStatus> {
    debug!(?args, "Parsed arguments");

    if args.init_config {
        return init_config(Path::new(LOCAL_CONFIG_FILE));
    }

    let path = args
        .file
        .clone()
        .ok_or_else(|| RestbookError::Argument("a request document is required".to_string()))?;

    if let Some(source) = &args.import {
        return import_into(&path, source);
    }

    let document = parse_http_file(&path)?;

    if args.format {
        save_http_file(&path, &document)?;
        eprintln!("Formatted {} ({} requests)", path.display(), document.len());
        return Ok(ExitStatus::Success);
    }

    let config = Config::load(args.config.as_deref())?;

    if args.list {
        return list(&args, &path, &document, &config);
    }

    let selected = select_requests(&document, &args.requests)?;

    if args.curl {
        for request in &selected {
            println!("{}\n", build_curl(request, args.dialect));
        }
        return Ok(ExitStatus::Success);
    }

    send_requests(&args, &env, &document, &config, &selected).await
}

/// Write the example config, refusing to overwrite an existing file
fn init_config(path: &Path) -> Result<ExitStatus> {
    if path.exists() {
        return Err(RestbookError::Config(format!("{} already exists", path.display())));
    }
    std::fs::write(path, EXAMPLE_CONFIG)?;
    eprintln!("Wrote example config to {}", path.display());
    Ok(ExitStatus::Success)
}

/// Import into a document, creating it when missing
fn import_into(path: &Path, source: &str) -> Result<ExitStatus> {
    let content = read_import_source(source)?;
    let imported = import_requests(&content)?;
    let count = imported.len();

    let mut document = if path.exists() {
        parse_http_file(path)?
    } else {
        Document::new(Vec::new(), VariableTable::new())
    };
    document.merge_imported(imported);
    save_http_file(path, &document)?;

    info!(count, path = %path.display(), "Imported requests");
    eprintln!("Imported {} request(s) into {}", count, path.display());
    Ok(ExitStatus::Success)
}

/// `-` reads stdin, an existing path is read as a file, anything else is
/// taken as the import text itself
fn read_import_source(source: &str) -> Result<String> {
    if source == "-" {
        let mut content = String::new();
        std::io::stdin().read_to_string(&mut content)?;
        return Ok(content);
    }

    let path = Path::new(source);
    if path.is_file() {
        return Ok(std::fs::read_to_string(path)?);
    }

    Ok(source.to_string())
}

fn list(args: &Args, path: &Path, document: &Document, config: &Config) -> Result<ExitStatus> {
    let rows = list_requests(document);
    if rows.is_empty() {
        eprintln!("No requests found in {}", path.display());
        return Ok(ExitStatus::Error);
    }

    let environment = args.environment.as_deref().or(config.defaults.environment.as_deref());
    let user = args.user.as_deref().or(config.defaults.user.as_deref());

    let mut context = Vec::new();
    if let Some(name) = environment {
        context.push(format!("environment: {}", name));
    }
    if let Some(name) = user {
        context.push(format!("user: {}", name));
    }
    if let Some(locale) = config.active_locale() {
        match &locale.timezone {
            Some(tz) => context.push(format!("locale: {} {}", locale.locale, tz)),
            None => context.push(format!("locale: {}", locale.locale)),
        }
    }

    if context.is_empty() {
        println!("Requests in {}:", path.display());
    } else {
        println!("Requests in {} ({}):", path.display(), context.join(", "));
    }
    for row in &rows {
        let marker = if row.bootstrap { "  (pre-auth)" } else { "" };
        println!("  [{}] {} {} - {}{}", row.index, row.method, row.name, row.url, marker);
    }

    if !document.variables.is_empty() {
        println!("Variables:");
        for name in document.variables.names() {
            let uses: usize = document.requests.iter().map(|r| count_usages(r, name)).sum();
            if uses == 0 {
                println!("  {} (unused)", name);
            } else {
                println!("  {} (used {}x)", name, uses);
            }
        }
    }

    let scope = base_scope(args, document, config, environment, user);
    let mut known = scope.variables().clone();
    known.declare("username", "");
    known.declare("password", "");
    if document.current_pre_auth().is_some() {
        known.declare(AUTH_VARIABLE, "");
    }

    let mut undefined: Vec<String> = Vec::new();
    for request in &document.requests {
        for name in undefined_variables(request, &known) {
            if !undefined.contains(&name) {
                undefined.push(name);
            }
        }
    }
    if !undefined.is_empty() {
        warn!(variables = ?undefined, "Undefined variables");
        println!("Undefined: {}", undefined.join(", "));
    }

    Ok(ExitStatus::Success)
}

/// Resolve `-r` filters against the document.
///
/// With no filter every request except the bootstrap is selected. A filter
/// is a 1-based index or a case-insensitive name substring.
fn select_requests<'a>(document: &'a Document, filters: &[String]) -> Result<Vec<&'a Request>> {
    if filters.is_empty() {
        return Ok(document.requests.iter().filter(|r| !r.is_bootstrap()).collect());
    }

    let mut selected: Vec<&Request> = Vec::new();
    for filter in filters {
        let matched: Vec<&Request> = if let Ok(idx) = filter.trim().parse::<usize>() {
            if idx == 0 || idx > document.len() {
                return Err(RestbookError::RequestNotFound(format!(
                    "{} (index out of range 1-{})",
                    filter,
                    document.len()
                )));
            }
            vec![&document.requests[idx - 1]]
        } else {
            let needle = filter.to_lowercase();
            document
                .requests
                .iter()
                .filter(|r| r.name.to_lowercase().contains(&needle))
                .collect()
        };

        if matched.is_empty() {
            return Err(RestbookError::RequestNotFound(filter.clone()));
        }
        for request in matched {
            if !selected.iter().any(|r| r.id == request.id) {
                selected.push(request);
            }
        }
    }
    Ok(selected)
}

/// Config, then document variables, then `--set`
fn base_scope(
    args: &Args,
    document: &Document,
    config: &Config,
    environment: Option<&str>,
    user: Option<&str>,
) -> VariableScope {
    let mut scope = VariableScope::new()
        .layer(&config.merged_variables(environment, user))
        .layer(document.variables());
    for assignment in &args.set {
        scope.set(assignment.name.as_str(), assignment.value.as_str());
    }
    scope
}

async fn send_requests(
    args: &Args,
    env: &Environment,
    document: &Document,
    config: &Config,
    selected: &[&Request],
) -> Result<ExitStatus> {
    let options = ClientOptions {
        timeout: args
            .timeout
            .or(config.defaults.timeout_secs)
            .map(Duration::from_secs)
            .unwrap_or_else(|| ClientOptions::default().timeout),
        insecure: args.insecure || config.defaults.insecure,
    };
    let client = HttpClient::new(&options)?;

    let mut scope = base_scope(args, document, config, args.environment.as_deref(), args.user.as_deref());

    let user_supplied_auth = args.set.iter().any(|a| a.name == AUTH_VARIABLE);
    if !args.no_pre_auth && !user_supplied_auth {
        if let Some(live) = document.current_pre_auth().filter(|p| p.enabled && p.is_complete()) {
            let mut live = live.clone();
            if let Some(username) = &args.pre_auth_username {
                live.username = Some(username.as_str().to_string());
            }
            if let Some(password) = &args.pre_auth_password {
                live.password = Some(password.as_str().to_string());
            }

            let value = execute_pre_auth(&client, &live, scope.variables()).await?;
            scope.set(AUTH_VARIABLE, value);
        }
    }

    let mut status = ExitStatus::Success;
    for request in selected {
        if signals::was_interrupted() {
            return Ok(ExitStatus::Interrupted);
        }

        let missing = undefined_variables(request, scope.variables());
        if !missing.is_empty() {
            warn!(request = %request.name, variables = ?missing, "Sending with undefined variables");
        }

        let resolved = scope.resolve(request);
        debug!(request = %request.name, url = %resolved.full_url(), "Resolved request");
        let response = client.send(&resolved).await;

        print_response(args, env, request, &response)?;
        status = status.with_response(response.is_error);
    }

    Ok(status)
}

fn print_response(args: &Args, env: &Environment, request: &Request, response: &HttpResponse) -> Result<()> {
    if args.json {
        let out = json!({
            "name": request.name,
            "method": request.method.as_str(),
            "response": response,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    let title = style(format!("### {}", request.name)).bold().force_styling(env.colors);
    println!("{}", title);

    let status_line = if response.status == 0 {
        format!("Error: {}", response.status_text)
    } else {
        format!("HTTP {} {}", response.status, response.status_text)
    };
    let status_line = if response.is_error {
        style(status_line).red().bold()
    } else {
        style(status_line).green().bold()
    };
    println!(
        "{}  {}",
        status_line.force_styling(env.colors),
        style(format!("({} ms)", response.duration_ms)).dim().force_styling(env.colors)
    );

    for (name, value) in &response.headers {
        println!("{}: {}", style(name).cyan().force_styling(env.colors), value);
    }

    let body = response.body_text();
    if !body.is_empty() {
        println!();
        println!("{}", body);
    }
    println!();
    Ok(())
}

fn handle_error(error: RestbookError, traceback: bool) -> ExitStatus {
    if traceback {
        eprintln!("restbook: error: {:?}", error);
    } else {
        eprintln!("restbook: error: {}", error);
    }

    ExitStatus::Error
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devexp::http_file::parse_http_content;

    fn document() -> Document {
        parse_http_content(
            "### @PRE-AUTH\n# @responsePath token\nPOST https://x/login\n\n\
             ### List users\nGET https://x/users\n\n\
             ### Get user\nGET https://x/users/1\n\n\
             ### Create order\nPOST https://x/orders\n",
        )
    }

    fn names(requests: &[&Request]) -> Vec<String> {
        requests.iter().map(|r| r.name.clone()).collect()
    }

    #[test]
    fn test_default_selection_skips_bootstrap() {
        let doc = document();
        let selected = select_requests(&doc, &[]).unwrap();
        assert_eq!(names(&selected), vec!["List users", "Get user", "Create order"]);
    }

    #[test]
    fn test_select_by_index_and_name() {
        let doc = document();
        let selected = select_requests(&doc, &["4".to_string(), "USER".to_string()]).unwrap();
        assert_eq!(names(&selected), vec!["Create order", "List users", "Get user"]);
    }

    #[test]
    fn test_selection_deduplicates() {
        let doc = document();
        let selected = select_requests(&doc, &["2".to_string(), "list".to_string()]).unwrap();
        assert_eq!(names(&selected), vec!["List users"]);
    }

    #[test]
    fn test_select_unknown() {
        let doc = document();
        assert!(matches!(
            select_requests(&doc, &["0".to_string()]),
            Err(RestbookError::RequestNotFound(_))
        ));
        assert!(matches!(
            select_requests(&doc, &["9".to_string()]),
            Err(RestbookError::RequestNotFound(_))
        ));
        assert!(matches!(
            select_requests(&doc, &["missing".to_string()]),
            Err(RestbookError::RequestNotFound(_))
        ));
    }

    #[test]
    fn test_scope_layering() {
        let doc = parse_http_content("@host = https://doc\n@page = 1\n### A\nGET {{host}}\n");
        let config = Config::parse(
            "[[environments]]\nname = \"local\"\n[environments.variables]\nhost = \"http://localhost\"\nregion = \"eu\"\n",
        )
        .unwrap();
        let args = Args::try_parse_from(["restbook", "--set", "page=7", "api.http"]).unwrap();

        let scope = base_scope(&args, &doc, &config, Some("local"), None);
        assert_eq!(scope.variables().get("host"), Some("https://doc"));
        assert_eq!(scope.variables().get("region"), Some("eu"));
        assert_eq!(scope.variables().get("page"), Some("7"));
    }

    #[test]
    fn test_read_import_source_inline() {
        let text = "curl https://x/y";
        assert_eq!(read_import_source(text).unwrap(), text);
    }

    #[test]
    fn test_init_config_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(LOCAL_CONFIG_FILE);

        assert_eq!(init_config(&path).unwrap(), ExitStatus::Success);
        assert!(Config::from_file(&path).is_ok());
        assert!(matches!(init_config(&path), Err(RestbookError::Config(_))));
    }
}
