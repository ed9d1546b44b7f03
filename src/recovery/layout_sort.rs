// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Reading order for layout regions
//!
//! Regions are sorted top-to-bottom, then grouped into runs of one-column
//! and two-column content. Inside a two-column run the whole left column is
//! emitted before the right column.

use crate::vision::types::{ColumnLayout, LayoutRegion};

/// Sort regions into reading order and tag each with its column layout
pub fn sort_layout_boxes(mut regions: Vec<LayoutRegion>, page_width: u32) -> Vec<LayoutRegion> {
    if regions.len() == 1 {
        regions[0].layout = Some(ColumnLayout::Single);
        return regions;
    }

    regions.sort_by_key(|r| (r.bbox[1], r.bbox[0]));

    let w = page_width as f32;
    let count = regions.len();
    let mut ordered = Vec::with_capacity(count);
    let mut left: Vec<LayoutRegion> = Vec::new();
    let mut right: Vec<LayoutRegion> = Vec::new();
    let mut prev_bottom: Option<i32> = None;

    for (i, mut region) in regions.into_iter().enumerate() {
        let [x0, y0, x1, y1] = region.bbox.map(|v| v as f32);
        let bottom = y1 as i32;

        if i == count - 1 {
            let below_previous = prev_bottom.map(|b| y0 > b as f32).unwrap_or(false);
            if below_previous && x0 < w / 2.0 && x1 > w / 2.0 {
                region.layout = Some(ColumnLayout::Single);
                ordered.append(&mut left);
                ordered.append(&mut right);
                ordered.push(region);
            } else {
                region.layout = Some(ColumnLayout::Double);
                if x1 > w / 2.0 {
                    right.push(region);
                } else {
                    left.push(region);
                }
                ordered.append(&mut left);
                ordered.append(&mut right);
            }
            break;
        }

        if x0 < w / 4.0 && x1 < 3.0 * w / 4.0 {
            region.layout = Some(ColumnLayout::Double);
            left.push(region);
        } else if x0 > w / 4.0 && x1 > w / 2.0 {
            region.layout = Some(ColumnLayout::Double);
            right.push(region);
        } else {
            region.layout = Some(ColumnLayout::Single);
            ordered.append(&mut left);
            ordered.append(&mut right);
            ordered.push(region);
        }
        prev_bottom = Some(bottom);
    }

    ordered.append(&mut left);
    ordered.append(&mut right);
    ordered
}
