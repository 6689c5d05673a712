//! Export of the archive tree
//!
//! - `config` - export metadata and switches
//! - `ncdu` - flattening into the ncdu export grammar
//! - `json` - JSON rendering and writing

mod config;
mod json;
mod ncdu;

pub use config::ExportConfig;
pub use json::{render_json, write_json};
pub use ncdu::{
    DirInfo, ExportDocument, ExportMeta, ExportNode, FileInfo, MAJOR_VERSION, MINOR_VERSION,
    export, flatten,
};
