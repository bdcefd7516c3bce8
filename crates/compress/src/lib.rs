mod batch;
mod fingerprint;
mod pipeline;
mod remote;
mod resize;
mod scan;
mod types;

pub use batch::{BatchRoots, run_batch};
pub use fingerprint::{fingerprint, fingerprint_reader};
pub use pipeline::{Compressed, CompressionPipeline, PipelineSettings};
pub use remote::{Compressor, DEFAULT_API_BASE, TinifyClient};
pub use resize::{ImageResizer, NoResize, PreparedInput, Resizer, scaled_height};
pub use scan::{collect_images, output_path_for};
pub use types::{CompressError, Result};
