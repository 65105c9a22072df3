//! Static front-end serving.
//!
//! Page paths map to fixed HTML files; everything else is looked up under
//! the asset root. Query strings never change which file is served, and a
//! trailing slash on a page path serves the same page.

use std::path::PathBuf;

use axum::Router;
use tower_http::services::{ServeDir, ServeFile};

use crate::config::StaticFilesConfig;

/// One route per configured page.
pub fn page_routes<S>(config: &StaticFilesConfig) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let root = PathBuf::from(&config.root);
    config
        .pages
        .iter()
        .fold(Router::new(), |router, (path, file)| {
            let page = ServeFile::new(root.join(file));
            if path == "/" {
                router.route_service(path, page)
            } else {
                router
                    .route_service(path, page.clone())
                    .route_service(&format!("{path}/"), page)
            }
        })
}

/// Fallback service for every other path.
pub fn asset_service(config: &StaticFilesConfig) -> ServeDir {
    ServeDir::new(&config.root)
}
