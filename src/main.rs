use std::{process, sync::Arc};

use lingora::{
    application::{
        admin::AdminTranslationService,
        error::AppError,
        repos::{TranslationsRepo, TranslationsWriteRepo},
        translations::TranslationResolver,
    },
    cache::{CacheConfig, MessageCache},
    config,
    domain::{locale::Locale, message_tree::MessageTree},
    infra::{
        bundles,
        db::PostgresRepositories,
        error::InfraError,
        http::{self, AdminAuth, AdminState, HttpState},
        telemetry,
    },
};
use tokio::try_join;
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Import(args) => run_import(settings, args).await,
        config::Command::Export(args) => run_export(settings, args).await,
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let repositories = init_repositories(&settings).await?;
    let app = build_application_context(repositories, &settings);

    info!(
        target = "lingora::serve",
        public = %settings.server.public_addr,
        admin = %settings.server.admin_addr,
        cache_enabled = settings.cache.enabled,
        cache_ttl_secs = settings.cache.ttl.as_secs(),
        admin_auth = app.admin_state.auth.is_enabled(),
        "Starting listeners"
    );

    serve_http(&settings, app.http_state, app.admin_state).await
}

async fn run_import(settings: config::Settings, args: config::ImportArgs) -> Result<(), AppError> {
    let path = args.file;
    info!(
        target = "lingora::import",
        path = %path.display(),
        locale = %args.locale,
        "Starting import"
    );

    let contents = tokio::fs::read(&path)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;
    let value: serde_json::Value = serde_json::from_slice(&contents)
        .map_err(|err| AppError::from(InfraError::from(err)))?;
    let document = MessageTree::from_json(&value)
        .filter(|tree| matches!(tree, MessageTree::Map(_)))
        .ok_or_else(|| {
            AppError::validation(format!(
                "{} must contain a JSON object of messages",
                path.display()
            ))
        })?;

    let repositories = init_repositories(&settings).await?;
    let reader: Arc<dyn TranslationsRepo> = repositories.clone();
    let writer: Arc<dyn TranslationsWriteRepo> = repositories;
    let service = AdminTranslationService::new(reader, writer);

    let saved = service
        .import_document(
            "cli",
            &args.locale,
            args.namespace.as_deref(),
            &document,
        )
        .await?;

    info!(
        target = "lingora::import",
        count = saved.len(),
        "Import completed"
    );
    Ok(())
}

async fn run_export(settings: config::Settings, args: config::ExportArgs) -> Result<(), AppError> {
    if Locale::from_code(args.locale.trim()).is_none() {
        warn!(
            target = "lingora::export",
            locale = %args.locale,
            default = %Locale::DEFAULT,
            "Unsupported locale; exporting the default instead"
        );
    }

    let repositories = init_repositories(&settings).await?;
    let app = build_application_context(repositories, &settings);
    let tree = app.http_state.resolver.resolve(&args.locale).await;

    let rendered = serde_json::to_vec_pretty(&tree.to_json())
        .map_err(|err| AppError::from(InfraError::from(err)))?;
    tokio::fs::write(&args.file, rendered)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(
        target = "lingora::export",
        path = %args.file.display(),
        messages = tree.leaf_count(),
        "Export completed"
    );
    Ok(())
}

struct ApplicationContext {
    http_state: HttpState,
    admin_state: AdminState,
}

async fn init_repositories(
    settings: &config::Settings,
) -> Result<Arc<PostgresRepositories>, AppError> {
    let database_url = settings
        .database
        .url
        .as_ref()
        .ok_or_else(|| InfraError::configuration("database url is not configured"))
        .map_err(AppError::from)?;

    let pool = PostgresRepositories::connect(database_url, settings.database.max_connections.get())
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    Ok(Arc::new(PostgresRepositories::new(pool)))
}

fn build_application_context(
    repositories: Arc<PostgresRepositories>,
    settings: &config::Settings,
) -> ApplicationContext {
    let translations_repo: Arc<dyn TranslationsRepo> = repositories.clone();
    let translations_write_repo: Arc<dyn TranslationsWriteRepo> = repositories;

    let cache = Arc::new(MessageCache::new(CacheConfig::from(&settings.cache)));
    let resolver = TranslationResolver::new(
        cache,
        translations_repo.clone(),
        bundles::from_settings(&settings.i18n),
    );

    let admin_translations = Arc::new(
        AdminTranslationService::new(translations_repo.clone(), translations_write_repo)
            .with_resolver(resolver.clone()),
    );

    let http_state = HttpState {
        resolver: resolver.clone(),
        store: translations_repo.clone(),
    };
    let admin_state = AdminState {
        translations: admin_translations,
        resolver,
        store: translations_repo,
        auth: AdminAuth::new(settings.admin.token.as_deref()),
    };

    ApplicationContext {
        http_state,
        admin_state,
    }
}

async fn serve_http(
    settings: &config::Settings,
    http_state: HttpState,
    admin_state: AdminState,
) -> Result<(), AppError> {
    let public_router = http::build_router(http_state);
    let admin_router = http::build_admin_router(admin_state);

    let public_listener = tokio::net::TcpListener::bind(settings.server.public_addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;
    let admin_listener = tokio::net::TcpListener::bind(settings.server.admin_addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    let public_server = axum::serve(public_listener, public_router.into_make_service())
        .with_graceful_shutdown(shutdown_signal());
    let admin_server = axum::serve(admin_listener, admin_router.into_make_service())
        .with_graceful_shutdown(shutdown_signal());

    let grace = settings.server.graceful_shutdown;
    let forced_exit = async move {
        shutdown_signal().await;
        tokio::time::sleep(grace).await;
    };

    tokio::select! {
        result = async { try_join!(public_server, admin_server) } => {
            result.map_err(|err| AppError::unexpected(format!("server error: {err}")))?;
        }
        _ = forced_exit => {
            warn!(
                target = "lingora::serve",
                grace_secs = grace.as_secs(),
                "Connections still open after the grace period; exiting"
            );
        }
    }

    info!(target = "lingora::serve", "Listeners stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(target = "lingora::serve", error = %err, "Failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!(target = "lingora::serve", error = %err, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
