mod handler;
mod io;
mod protocol;

use std::sync::Arc;

use crate::{
    cli::Args,
    config::RouterConfig,
    engine::executor::BlobStore,
    error::{AppError, AppResult},
    host::{DbTarget, FolderBlobStore, HostOptions, SqliteHost},
};

use handler::RequestRouter;
use io::NdjsonIo;
use protocol::BridgeRequest;

pub fn run(args: Args) -> AppResult<()> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let host = SqliteHost::open(
        DbTarget::File(args.db.clone()),
        &HostOptions {
            row_ceiling: args.row_ceiling,
            busy_timeout_ms: args.busy_timeout_ms,
        },
    )?;
    let blobs = args
        .query_folder
        .as_ref()
        .map(|dir| Arc::new(FolderBlobStore::new(dir)) as Arc<dyn BlobStore>);
    let router = RequestRouter::new(RouterConfig::from(&args), Arc::new(host), blobs);

    tracing::info!(
        db = %args.db.display(),
        query_folder = ?args.query_folder,
        window_size = args.window_size,
        max_page_size = args.max_page_size,
        "bridge ready"
    );

    rt.block_on(async move {
        let mut io = NdjsonIo::new(std::io::stdin().lock(), std::io::stdout().lock());

        while let Some(line) = io.read_line()? {
            let req: BridgeRequest = match serde_json::from_str(&line) {
                Ok(r) => r,
                Err(e) => {
                    tracing::warn!(error = %e, "unparsable request line");
                    io.protocol_error(e.to_string())?;
                    continue;
                }
            };

            let resp = router.handle(req).await;
            io.write_json_line(&resp)?;
        }

        Ok(())
    })
}
