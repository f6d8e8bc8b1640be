//! CLI command implementations

pub mod clear;
pub mod config;
pub mod hints;
pub mod load;
pub mod prime;
pub mod purge;
pub mod read;
pub mod show;

pub use clear::execute as clear;
pub use config::execute as config;
pub use hints::execute as hints;
pub use load::execute as load;
pub use prime::execute as prime;
pub use purge::execute as purge;
pub use read::execute as read;
pub use show::execute as show;

use crate::cli::host::ReportingHost;
use crate::config::Config;
use crate::error::LoaderResult;
use crate::loader::ModuleLoader;
use crate::mapping::StreamLoader;
use crate::vfs::VirtualSourceRegistry;
use std::sync::Arc;

/// A loader whose executed streams can be inspected afterwards
pub(crate) struct CliLoader {
    pub loader: ModuleLoader,
    pub files: Arc<StreamLoader<ReportingHost>>,
}

pub(crate) fn build_loader(config: &Config) -> LoaderResult<CliLoader> {
    let files = Arc::new(
        StreamLoader::new(VirtualSourceRegistry::new(), ReportingHost::new())
            .with_mapping(config.loader.enable_mapping),
    );
    let loader = ModuleLoader::from_config(config, None, files.clone())?;
    Ok(CliLoader { loader, files })
}
