use qoicodec::types::FormatError;
use qoicodec::{
    decode, decode_header, encode, ErrorKind, Pixel, QoiChannels, QoiColorSpace, QoiHeader,
};

fn header(width: u32, height: u32) -> QoiHeader {
    QoiHeader::new(width, height, QoiChannels::Rgba, QoiColorSpace::SRgbWithLinearAlpha)
}

fn op_stream(data: &[u8]) -> &[u8] {
    &data[14..data.len() - 8]
}

#[test]
fn header_layout() {
    let missing = encode(
        &QoiHeader::new(0x0102_0304, 1, QoiChannels::Rgb, QoiColorSpace::AllChannelsLinear),
        &[],
    );
    // the pixel count is checked before anything is written
    assert_eq!(missing.unwrap_err().kind(), ErrorKind::InvalidArgument);

    let data = encode(&header(2, 1), &[Pixel::START, Pixel::START]).unwrap();
    assert_eq!(
        data,
        [b'q', b'o', b'i', b'f', 0, 0, 0, 2, 0, 0, 0, 1, 4, 0, 0xc1, 0, 0, 0, 0, 0, 0, 0, 1]
    );
    assert_eq!(decode_header(&data).unwrap(), header(2, 1));
}

#[test]
fn run_folding() {
    let mut pixels = vec![Pixel::rgb(10, 20, 30)];
    pixels.extend([Pixel::rgb(10, 20, 30); 65]);

    let data = encode(&header(66, 1), &pixels).unwrap();
    assert_eq!(op_stream(&data), &[0xfe, 10, 20, 30, 0xc0 | 61, 0xc0 | 2]);
    assert_eq!(decode(&data).unwrap().1, pixels);
}

#[test]
fn exact_multiple_runs_have_no_empty_tail() {
    let mut pixels = vec![Pixel::rgb(10, 20, 30)];
    pixels.extend([Pixel::rgb(10, 20, 30); 124]);

    let data = encode(&header(125, 1), &pixels).unwrap();
    assert_eq!(op_stream(&data), &[0xfe, 10, 20, 30, 0xfd, 0xfd]);
}

#[test]
fn op_preference() {
    let data = encode(&header(1, 1), &[Pixel::rgb(10, 20, 30)]).unwrap();
    assert_eq!(op_stream(&data), &[0xfe, 10, 20, 30]);

    let data = encode(&header(1, 1), &[Pixel::rgba(5, 5, 5, 200)]).unwrap();
    assert_eq!(op_stream(&data), &[0xff, 5, 5, 5, 200]);

    // diff is taken before luma, luma before rgb
    let pixels = [Pixel::rgb(1, 255, 0), Pixel::rgb(20, 19, 18), Pixel::rgb(1, 255, 0)];
    let data = encode(&header(3, 1), &pixels).unwrap();
    let ops = op_stream(&data);
    assert_eq!(ops[0], 0x40 | (3 << 4) | (1 << 2) | 2);
    // dg 20, dr-dg -1, db-dg -2
    assert_eq!(ops[1..3], [0x80 | 52, 0x76]);
    assert_eq!(ops[3], Pixel::rgb(1, 255, 0).pixel_hash());
    assert_eq!(ops.len(), 4);
}

#[test]
fn wrong_magic() {
    let mut data = encode(&header(1, 1), &[Pixel::rgb(1, 2, 3)]).unwrap();
    data[0] = b'Q';

    assert_eq!(
        decode_header(&data),
        Err(FormatError::InvalidMagic { found: *b"Qoif" })
    );
    assert_eq!(decode(&data).unwrap_err().kind(), ErrorKind::Format);
}

#[test]
fn one_byte_short() {
    let pixels = [Pixel::rgb(10, 20, 30), Pixel::rgb(50, 60, 70)];
    let data = encode(&header(2, 1), &pixels).unwrap();

    // drop the last byte of the op stream, the footer stays intact
    let mut short = data.clone();
    short.remove(data.len() - 9);
    assert_eq!(decode(&short).unwrap_err().kind(), ErrorKind::Format);

    // drop the whole last op
    let mut short = data.clone();
    short.drain(data.len() - 12..data.len() - 8);
    assert_eq!(decode(&short).unwrap_err().kind(), ErrorKind::Format);

    // drop the last byte of the file
    assert_eq!(
        decode(&data[..data.len() - 1]).unwrap_err().kind(),
        ErrorKind::Format
    );
}

#[test]
fn extra_pixels_overrun() {
    let data = encode(&header(3, 1), &[Pixel::rgb(9, 9, 9); 3]).unwrap();

    // claim one pixel less than the stream covers
    let mut data = data;
    data[7] = 2;
    assert_eq!(decode(&data).unwrap_err().kind(), ErrorKind::BufferOverrun);
}
