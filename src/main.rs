use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use farmgate_core::catalog::{PermissionCatalog, RoleRegistry};
use farmgate_core::domain::{PrincipalContext, Scope, UserId};
use farmgate_core::repository::Snapshot;
use farmgate_core::{telemetry, Config, ContextBuilder, CustomRoleResolver, DecisionEngine};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

const EXIT_DENIED: u8 = 1;
const EXIT_ERROR: u8 = 2;

#[derive(Parser)]
#[command(
    name = "farmgate-core",
    version,
    about = "Authorization decision engine for the Farmgate console"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List every permission, grouped by category.
    Catalog {
        #[arg(long)]
        json: bool,
    },

    /// List the built-in roles with their scope bounds.
    Roles {
        #[arg(long)]
        json: bool,
    },

    /// Decide one permission check against a snapshot.
    ///
    /// Exits 0 on allow, 1 on deny, 2 on error.
    Check {
        /// Snapshot JSON file (default: FARMGATE_SNAPSHOT_PATH).
        #[arg(long)]
        snapshot: Option<PathBuf>,

        #[arg(long)]
        user: UserId,

        /// Permission code, e.g. DEVICE_CONFIGURE.
        #[arg(long)]
        permission: String,

        /// Target scope, e.g. "tenant:<id>/farm:<id>".
        #[arg(long)]
        scope: Scope,
    },

    /// Print every permission a user holds at a scope.
    Explain {
        #[arg(long)]
        snapshot: Option<PathBuf>,

        #[arg(long)]
        user: UserId,

        #[arg(long)]
        scope: Scope,
    },
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e:#}");
            return ExitCode::from(EXIT_ERROR);
        }
    };
    telemetry::init(&config.telemetry);

    let result = match cli.command {
        Command::Catalog { json } => run_catalog(json),
        Command::Roles { json } => run_roles(json),
        Command::Check {
            snapshot,
            user,
            permission,
            scope,
        } => run_check(&config, snapshot, user, &permission, &scope),
        Command::Explain {
            snapshot,
            user,
            scope,
        } => run_explain(&config, snapshot, user, &scope),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "Command failed");
            eprintln!("Error: {e:#}");
            ExitCode::from(EXIT_ERROR)
        }
    }
}

fn run_catalog(json: bool) -> Result<ExitCode> {
    let categories = PermissionCatalog.categories();
    if json {
        println!("{}", serde_json::to_string_pretty(&categories)?);
        return Ok(ExitCode::SUCCESS);
    }

    for listing in categories {
        println!("{} ({})", listing.display_name, listing.category.as_str());
        for permission in listing.permissions {
            if permission.is_platform_only() {
                println!("  {permission}  [platform-only]");
            } else {
                println!("  {permission}");
            }
        }
        println!();
    }
    Ok(ExitCode::SUCCESS)
}

fn run_roles(json: bool) -> Result<ExitCode> {
    let definitions = RoleRegistry.definitions();
    if json {
        println!("{}", serde_json::to_string_pretty(&definitions)?);
        return Ok(ExitCode::SUCCESS);
    }

    for definition in definitions {
        println!(
            "{:<18} {:<8} ..= {:<8} {:>2} permissions  {}",
            definition.role.id(),
            definition.min_scope_class.as_str(),
            definition.max_scope_class.as_str(),
            definition.permissions.len(),
            definition.display_name
        );
    }
    Ok(ExitCode::SUCCESS)
}

fn run_check(
    config: &Config,
    snapshot: Option<PathBuf>,
    user: UserId,
    permission: &str,
    scope: &Scope,
) -> Result<ExitCode> {
    let (engine, context) = load_context(config, snapshot, user)?;
    let decision = engine.decide_code(&context, permission, scope)?;

    let output = serde_json::json!({
        "decision": decision.view(),
        "message": decision.reason.as_ref().map(|r| r.message()),
        "warnings": context.warnings(),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);

    if decision.allowed {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(EXIT_DENIED))
    }
}

fn run_explain(
    config: &Config,
    snapshot: Option<PathBuf>,
    user: UserId,
    scope: &Scope,
) -> Result<ExitCode> {
    let (engine, context) = load_context(config, snapshot, user)?;
    let permissions = engine.effective_permissions(&context, scope);

    let output = serde_json::json!({
        "user_id": context.user_id(),
        "scope": scope.to_string(),
        "permissions": permissions,
        "bindings": context.bindings(),
        "inactive_roles": context.inactive_roles(),
        "warnings": context.warnings(),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(ExitCode::SUCCESS)
}

fn load_context(
    config: &Config,
    snapshot: Option<PathBuf>,
    user: UserId,
) -> Result<(DecisionEngine, PrincipalContext)> {
    let path = snapshot
        .or_else(|| config.snapshot_path.clone())
        .context("No snapshot given: pass --snapshot or set FARMGATE_SNAPSHOT_PATH")?;
    let snapshot = Snapshot::load(&path)?;

    let builder = ContextBuilder::new(
        Arc::new(snapshot.org_directory()),
        Arc::new(snapshot.custom_role_repository()),
    )
    .enforce_tenant_membership(config.engine.enforce_tenant_membership);
    let context = builder.build(snapshot.user(user)?)?;

    let resolver = CustomRoleResolver::with_capacity(config.engine.custom_role_cache_capacity);
    Ok((DecisionEngine::new(Arc::new(resolver)), context))
}
