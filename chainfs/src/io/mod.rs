mod block;
mod device;

pub use block::{BlockDevice, BlockNumber};
pub use device::{FileBlockDevice, FileBlockDeviceBuilder};
