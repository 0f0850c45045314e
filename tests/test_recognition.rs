mod common;

use common::fixtures::*;
use marksheet::DigitTensor;
use marksheet::recognition::digit::normalize_digit;
use marksheet::recognition::identifier::{digit_boxes, read_identifier, segment_identifier};

#[test]
fn digit_boxes_come_out_in_ascending_x_order() {
    // blobs drawn right-to-left; reading order must not depend on that
    let crop = sheet_with_blocks(
        160,
        40,
        &[(120, 10, 10, 20, 0), (20, 10, 10, 20, 0), (70, 10, 10, 20, 0)],
    );

    let boxes = digit_boxes(&crop);
    assert_eq!(boxes.len(), 3);
    assert!(boxes[0].x < boxes[1].x);
    assert!(boxes[1].x < boxes[2].x);
}

#[test]
fn segmentation_yields_one_tensor_per_box() {
    let crop = sheet_with_blocks(160, 40, &[(20, 10, 10, 20, 0), (70, 10, 10, 20, 0)]);

    let boxes = digit_boxes(&crop);
    let tensors = segment_identifier(&crop);
    assert_eq!(boxes.len(), tensors.len());
    for tensor in &tensors {
        assert_eq!(tensor.pixels().len(), DigitTensor::SIDE * DigitTensor::SIDE);
        assert!(tensor.pixels().iter().all(|v| (0.0..=1.0).contains(v)));
    }
}

#[test]
fn noise_specks_are_rejected_by_the_size_filter() {
    // a 2x2 speck and a thin 2px-wide vertical artifact next to one digit
    let crop = sheet_with_blocks(
        160,
        40,
        &[(20, 10, 10, 20, 0), (60, 12, 2, 2, 0), (100, 10, 2, 20, 0)],
    );

    assert_eq!(digit_boxes(&crop).len(), 1);
}

#[test]
fn glyph_holes_contribute_their_own_boxes() {
    // a hollow rectangle: outer border plus the enclosed hole, both kept
    let crop = sheet_with_blocks(
        80,
        50,
        &[
            (20, 10, 16, 4, 0),
            (20, 26, 16, 4, 0),
            (20, 10, 4, 20, 0),
            (32, 10, 4, 20, 0),
        ],
    );

    let boxes = digit_boxes(&crop);
    assert_eq!(boxes.len(), 2);
}

#[test]
fn identifier_without_qualifying_contours_reads_as_empty() -> anyhow::Result<()> {
    // the whole-crop contour fails the width filter, nothing qualifies
    let crop = white_sheet(3, 20);
    let classifier = ConstClassifier(7);

    assert!(segment_identifier(&crop).is_empty());
    assert_eq!(read_identifier(&crop, &classifier)?, "");
    Ok(())
}

#[test]
fn contourless_digit_crop_normalizes_to_the_zero_tensor() {
    // uniform black: thresholding leaves no foreground at all
    let crop = sheet_with_blocks(20, 20, &[(0, 0, 20, 20, 0)]);

    let tensor = normalize_digit(&crop);
    assert_eq!(tensor, DigitTensor::zeros());
}

#[test]
fn blank_tensor_still_classifies() -> anyhow::Result<()> {
    let crop = sheet_with_blocks(20, 20, &[(0, 0, 20, 20, 0)]);
    let classifier = ConstClassifier(4);

    let tensor = normalize_digit(&crop);
    let digit = marksheet::inference::predict_digit(&classifier, &tensor)?;
    assert_eq!(digit, '4');
    Ok(())
}

#[test]
fn normalized_digit_tensor_has_canonical_shape_and_range() {
    let crop = sheet_with_blocks(60, 60, &[(15, 15, 30, 30, 0)]);

    let tensor = normalize_digit(&crop);
    assert_eq!(tensor.pixels().len(), DigitTensor::SIDE * DigitTensor::SIDE);
    assert!(tensor.pixels().iter().all(|v| (0.0..=1.0).contains(v)));
}
