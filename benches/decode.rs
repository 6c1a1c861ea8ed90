use criterion::{black_box, criterion_group, criterion_main, Criterion};
use picgif::{Decoder, Encoder, Step};
use pix::rgb::SRgba8;
use pix::Raster;
use std::io::Cursor;

/// Build an animated GIF with a square bouncing across the screen
fn animation() -> Vec<u8> {
    let mut buf = Vec::with_capacity(32768);
    let mut enc = Encoder::new(&mut buf).into_step_enc().with_loop_count(0);
    let mut steps = Vec::with_capacity(16);
    for i in 0..16u32 {
        let mut raster = Raster::<SRgba8>::with_clear(64, 64);
        for y in i..i + 16 {
            for x in i * 3..i * 3 + 16 {
                *raster.pixel_mut(x as i32, y as i32) =
                    SRgba8::new((i * 16) as u8, 0xFF - (i * 16) as u8, 0, 255);
            }
        }
        steps.push(Step::with_true_color(raster).with_delay_time_cs(10));
    }
    enc.encode_animation(&steps).unwrap();
    drop(enc);
    buf
}

fn decode_animation_frames(crit: &mut Criterion) {
    let gif = animation();

    crit.bench_function("decode_frames", |b| {
        b.iter(|| {
            let decoder =
                Decoder::new(Cursor::new(black_box(&gif[..]))).into_frames();
            for frame in decoder {
                black_box(frame.unwrap());
            }
        })
    });
}

fn decode_animation_steps(crit: &mut Criterion) {
    let gif = animation();

    crit.bench_function("decode_steps", |b| {
        b.iter(|| {
            let decoder =
                Decoder::new(Cursor::new(black_box(&gif[..]))).into_steps();
            for step in decoder {
                black_box(step.unwrap());
            }
        })
    });
}

criterion_group!(benches, decode_animation_frames, decode_animation_steps);
criterion_main!(benches);
