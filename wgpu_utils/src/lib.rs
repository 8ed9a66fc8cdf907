mod bind_group;
mod gpu;
mod texture;

pub use bind_group::{BindGroupDescriptor, BindingResourceTemplate, BufferType};
pub use gpu::{pick_surface_format, setup_gpu, Gpu};
pub use texture::{check_frame_size, FrameTexture};
