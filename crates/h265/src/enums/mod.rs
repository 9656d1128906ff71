mod aspect_ratio_idc;
pub use aspect_ratio_idc::*;

mod nal_unit_type;
pub use nal_unit_type::*;

mod video_format;
pub use video_format::*;

mod profile_compatibility_flags;
pub use profile_compatibility_flags::*;
