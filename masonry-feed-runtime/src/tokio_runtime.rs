use std::{io, sync::OnceLock};

use tokio::runtime::{Builder, Runtime};

static RUNTIME: OnceLock<Runtime> = OnceLock::new();

/// Process-wide runtime used when the caller is not already inside one.
pub(crate) fn get() -> io::Result<&'static Runtime> {
    if let Some(runtime) = RUNTIME.get() {
        return Ok(runtime);
    }
    let runtime = Builder::new_multi_thread()
        .thread_name("masonry-feed")
        .enable_all()
        .build()?;
    // A racing initialiser may have won; its runtime is kept and ours dropped.
    Ok(RUNTIME.get_or_init(|| runtime))
}
