#![no_std]

extern crate alloc;

pub mod decode;
pub mod encode;
pub mod raster;

pub use qoicodec_types as types;
pub use qoicodec_types::{
    Error, ErrorKind, Pixel, QoiChannels, QoiColorSpace, QoiHeader, QOI_FOOTER, QOI_MAGIC,
};

pub use decode::{decode, decode_header, QoiChunkDecoder, QoiDecoder};
pub use encode::{encode, QoiChunkEncoder, QoiEncoder};
