// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Data-URI decoding through the public vision API

use snapdetect_server::vision::{decode_payload, ChannelOrder, DecodeError, EncodedImagePayload};

use crate::common::{data_uri, encode_jpeg, encode_png, png_data_uri};

// 1x1 GIF
const TINY_GIF_BASE64: &str = "R0lGODlhAQABAIAAAP///wAAACH5BAEAAAAALAAAAAABAAEAAAICRAEAOw==";

#[test]
fn test_png_dimensions_survive_decoding() {
    let raster = decode_payload(&png_data_uri(123, 45), ChannelOrder::Rgb).unwrap();
    assert_eq!(raster.width(), 123);
    assert_eq!(raster.height(), 45);
    assert_eq!(raster.pixels().len(), 123 * 45 * 3);
}

#[test]
fn test_jpeg_and_gif_are_supported() {
    let jpeg = decode_payload(&data_uri("image/jpeg", &encode_jpeg(16, 9)), ChannelOrder::Rgb)
        .unwrap();
    assert_eq!((jpeg.width(), jpeg.height()), (16, 9));

    let gif = decode_payload(
        &format!("data:image/gif;base64,{}", TINY_GIF_BASE64),
        ChannelOrder::Rgb,
    )
    .unwrap();
    assert_eq!((gif.width(), gif.height()), (1, 1));
}

#[test]
fn test_bgr_swaps_red_and_blue() {
    let payload = png_data_uri(4, 4);
    let rgb = decode_payload(&payload, ChannelOrder::Rgb).unwrap();
    let bgr = decode_payload(&payload, ChannelOrder::Bgr).unwrap();

    let [r, g, b] = rgb.pixel(3, 2).unwrap();
    assert_eq!(bgr.pixel(3, 2).unwrap(), [b, g, r]);
    assert_eq!(bgr.channel_order(), ChannelOrder::Bgr);
}

#[test]
fn test_wrapped_base64_is_accepted() {
    let payload = png_data_uri(10, 10);
    let (prefix, data) = payload.split_once(',').unwrap();
    let wrapped: Vec<String> = data
        .as_bytes()
        .chunks(16)
        .map(|chunk| String::from_utf8(chunk.to_vec()).unwrap())
        .collect();
    let payload = format!("{},{}", prefix, wrapped.join("\n"));

    let raster = decode_payload(&payload, ChannelOrder::Rgb).unwrap();
    assert_eq!((raster.width(), raster.height()), (10, 10));
}

#[test]
fn test_only_first_comma_splits() {
    let payload = EncodedImagePayload::parse("a,b,c").unwrap();
    assert_eq!(payload.prefix(), "a");
    assert_eq!(payload.data(), "b,c");
}

#[test]
fn test_decode_failures_are_typed() {
    assert!(matches!(
        decode_payload("no separator here", ChannelOrder::Rgb),
        Err(DecodeError::MissingSeparator)
    ));
    assert!(matches!(
        decode_payload("data:image/png;base64,", ChannelOrder::Rgb),
        Err(DecodeError::EmptyData)
    ));
    assert!(matches!(
        decode_payload("data:image/png;base64,!!!!", ChannelOrder::Rgb),
        Err(DecodeError::InvalidBase64(_))
    ));

    let mut truncated = encode_png(8, 8);
    truncated.truncate(40);
    assert!(decode_payload(&data_uri("image/png", &truncated), ChannelOrder::Rgb).is_err());
}
