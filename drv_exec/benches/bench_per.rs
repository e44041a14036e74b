//! # Perception Benchmark

use chrono::{TimeZone, Utc};
use criterion::{criterion_group, criterion_main, Criterion};
use image::{Rgb, RgbImage};

use drv_lib::per::{
    region::{largest_region, regions},
    road::find_centre,
    DetectParams, DetectorBank, Frame, ScanParams,
};

/// Road scene with a crosswalk band and a few patches of colour for the detectors to chew on.
fn course_frame(seq: u64) -> Frame {
    let mut img = RgbImage::from_pixel(1280, 720, Rgb([40, 40, 40]));

    let mut fill = |x: u32, y: u32, w: u32, h: u32, rgb: [u8; 3]| {
        for yy in y..(y + h).min(720) {
            for xx in x..(x + w).min(1280) {
                img.put_pixel(xx, yy, Rgb(rgb));
            }
        }
    };

    // Road surface and crosswalk
    fill(200, 360, 880, 360, [85, 85, 85]);
    fill(300, 420, 600, 40, [255, 0, 0]);

    // Some blobs which move from frame to frame
    let shift = (seq as u32 * 7) % 200;
    fill(100 + shift, 150, 60, 120, [60, 120, 30]);
    fill(900 - shift, 200, 90, 50, [20, 60, 200]);

    Frame::new(
        img,
        Utc.timestamp_millis_opt(1000 + seq as i64 * 100).unwrap(),
        seq,
    )
}

fn per_benchmark(c: &mut Criterion) {
    let frame = course_frame(0);
    let mut bank = DetectorBank::new(DetectParams::default());
    let road_mask = bank.road_mask(&frame);

    c.bench_function("region::regions", |b| b.iter(|| regions(&road_mask)));

    c.bench_function("region::largest_region", |b| {
        b.iter(|| largest_region(&road_mask))
    });

    let scan = ScanParams {
        offset_px: 200,
        line_width_px: 150,
    };
    c.bench_function("road::find_centre", |b| {
        b.iter(|| find_centre(&road_mask, &scan))
    });

    let frames: Vec<Frame> = (1..=8).map(course_frame).collect();
    let mut next = 0;
    c.bench_function("DetectorBank::update", |b| {
        b.iter(|| {
            bank.update(&frames[next % frames.len()]);
            next += 1;
        })
    });

    c.bench_function("DetectorBank::detectors", |b| {
        b.iter(|| {
            (
                bank.crosswalk(&frame),
                bank.pedestrian_occupied(&frame),
                bank.route_marker(&frame),
                bank.mascot_present(&frame),
                bank.tunnel(&frame),
                bank.summit(&frame),
            )
        })
    });
}

criterion_group!(benches, per_benchmark);
criterion_main!(benches);
