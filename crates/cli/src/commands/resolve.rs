use std::path::Path;
use std::process;
use std::sync::Arc;

use salonbook_access::lookup::http::HttpLookup;
use salonbook_access::lookup::store::StoreLookup;
use salonbook_access::{
    AccessConfig, HttpConfig, ProfileLookupPort, ResolveOptions, UserId, UserStateResolver,
};
use salonbook_core::{guard, Surface};
use salonbook_storage::MemoryStore;

use super::print_result;
use crate::{report_error, OutputFormat};

pub(crate) struct ResolveArgs<'a> {
    pub user: &'a str,
    pub base_url: Option<&'a str>,
    pub token: Option<&'a str>,
    pub fixtures: Option<&'a Path>,
    pub path: Option<&'a str>,
}

pub(crate) fn cmd_resolve(
    args: ResolveArgs<'_>,
    config: &AccessConfig,
    output: OutputFormat,
    quiet: bool,
) {
    let surface = match args.path {
        None => None,
        Some(p) => match Surface::from_path(p) {
            Some(s) => Some((p, s)),
            None => {
                report_error(
                    &format!("error: '{}' is not a guarded route", p),
                    output,
                    quiet,
                );
                process::exit(1);
            }
        },
    };

    let port = match build_lookup(&args, config) {
        Ok(p) => p,
        Err(msg) => {
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    };
    tracing::debug!(lookup = port.lookup_id(), user_id = args.user, "resolving user state");

    let resolver = UserStateResolver::from_config(port, config);
    tracing::debug!(ttl_ms = config.cache.ttl_ms, "client cache configured");
    let user_id = UserId::new(args.user);

    let rt = crate::runtime(output, quiet);
    let result = rt.block_on(resolver.get_user_state(Some(&user_id), ResolveOptions::default()));

    let decision = surface.map(|(p, s)| (p, guard(&result, s)));
    print_result(
        &result,
        decision.as_ref().map(|(p, d)| (*p, d)),
        output,
        quiet,
    );
}

/// HTTP when a base URL is known (flag, then config), otherwise the
/// fixture-backed store (flag, then config).
fn build_lookup(
    args: &ResolveArgs<'_>,
    config: &AccessConfig,
) -> Result<Arc<dyn ProfileLookupPort>, String> {
    let base_url = args
        .base_url
        .map(str::to_string)
        .or_else(|| Some(config.http.base_url.clone()).filter(|u| !u.trim().is_empty()));

    if let Some(base_url) = base_url {
        let http = HttpConfig {
            base_url,
            auth_token: args
                .token
                .map(str::to_string)
                .or_else(|| config.http.auth_token.clone()),
            timeout_secs: config.http.timeout_secs,
        };
        let lookup = HttpLookup::new(&http).map_err(|e| format!("error: {}", e))?;
        return Ok(Arc::new(lookup));
    }

    let fixtures = args
        .fixtures
        .map(Path::to_path_buf)
        .or_else(|| config.store.fixtures.clone());

    match fixtures {
        Some(path) => {
            let store = MemoryStore::from_fixture_file(&path).map_err(|e| format!("error: {}", e))?;
            Ok(Arc::new(StoreLookup::new(Arc::new(store))))
        }
        None => Err(
            "error: no lookup backend: pass --base-url or --fixtures, or set [http] or [store] in --config"
                .to_string(),
        ),
    }
}
