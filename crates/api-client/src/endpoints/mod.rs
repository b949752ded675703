//! Endpoint-specific API implementations
//!
//! | Module | Upstream path | Description |
//! |--------|---------------|-------------|
//! | `products` | `/api/v2/product/{code}.json` | Barcode lookup |
//! | `search` | `/cgi/search.pl` | Free-text product search |

pub mod products;
pub mod search;

pub use products::ProductsApi;
pub use search::SearchApi;
