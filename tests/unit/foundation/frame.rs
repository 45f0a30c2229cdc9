use super::*;

#[test]
fn rejects_zero_sized_frames() {
    assert!(Frame::new(RgbImage::new(0, 4)).is_err());
    assert!(Frame::solid(4, 0, [0, 0, 0]).is_err());
}

#[test]
fn clone_shares_pixels() {
    let a = Frame::solid(4, 4, [10, 20, 30]).unwrap();
    let b = a.clone();
    assert_eq!(a, b);
    assert_eq!(b.as_image().get_pixel(0, 0).0, [10, 20, 30]);
}

#[test]
fn to_rgb_image_is_an_independent_copy() {
    let a = Frame::solid(2, 2, [5, 5, 5]).unwrap();
    let mut copy = a.to_rgb_image();
    copy.put_pixel(0, 0, image::Rgb([200, 0, 0]));
    assert_eq!(a.as_image().get_pixel(0, 0).0, [5, 5, 5]);
}

#[test]
fn fingerprint_is_stable_and_content_sensitive() {
    let a = Frame::solid(8, 8, [1, 2, 3]).unwrap();
    let b = Frame::solid(8, 8, [1, 2, 3]).unwrap();
    assert_eq!(a.fingerprint(), b.fingerprint());

    let c = Frame::solid(8, 8, [1, 2, 4]).unwrap();
    assert_ne!(a.fingerprint(), c.fingerprint());
}

#[test]
fn fingerprint_distinguishes_dimensions_with_same_bytes() {
    let wide = Frame::solid(8, 2, [9, 9, 9]).unwrap();
    let tall = Frame::solid(2, 8, [9, 9, 9]).unwrap();
    assert_ne!(wide.fingerprint(), tall.fingerprint());
}

#[test]
fn equality_compares_pixel_content() {
    let a = Frame::solid(3, 3, [7, 7, 7]).unwrap();
    let b = Frame::new(RgbImage::from_pixel(3, 3, image::Rgb([7, 7, 7]))).unwrap();
    assert_eq!(a, b);
    let c = Frame::solid(3, 3, [7, 7, 8]).unwrap();
    assert_ne!(a, c);
}
