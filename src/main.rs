//! Entry point for the Language Server Protocol implementation.

use linguist_language_server::Backend;
use tower_lsp::{
    LspService,
    Server,
};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Log filter, in `EnvFilter` syntax.
const LOG_ENV: &str = "LINGUIST_LS_LOG";
/// Directory of the optional daily log file.
const LOG_DIR_ENV: &str = "LINGUIST_LS_LOG_DIR";

/// Installs the subscriber. Stdout carries the protocol, so logs go to
/// stderr and, when configured, a rolling file.
///
/// The returned guard flushes the file writer on drop.
fn init_tracing() -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    let stderr_layer =
        tracing_subscriber::fmt::layer().with_writer(std::io::stderr).with_ansi(false);

    let (file_layer, guard) = match std::env::var_os(LOG_DIR_ENV) {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "linguist-ls.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry().with(filter).with(stderr_layer).with(file_layer).init();
    guard
}

#[tokio::main]
async fn main() {
    let _guard = init_tracing();
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting linguist language server");

    let (stdin, stdout) = (tokio::io::stdin(), tokio::io::stdout());
    let (service, socket) = LspService::new(Backend::new);
    Server::new(stdin, stdout, socket).serve(service).await;
}
