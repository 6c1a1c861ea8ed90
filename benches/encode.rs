use criterion::{black_box, criterion_group, criterion_main, Criterion};
use picgif::{Decoder, Encoder, Step, block::Block};
use pix::rgb::SRgba8;
use pix::Raster;
use std::io::Cursor;

/// Build an animated GIF with a square bouncing across the screen
fn animation() -> Vec<u8> {
    let mut buf = Vec::with_capacity(32768);
    let mut enc = Encoder::new(&mut buf).into_step_enc().with_loop_count(0);
    enc.encode_animation(&steps()).unwrap();
    drop(enc);
    buf
}

/// Build the animation steps
fn steps() -> Vec<Step> {
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
    steps
}

fn encode_blocks(crit: &mut Criterion) {
    let gif = animation();
    let blocks: Vec<Block> = Decoder::new(Cursor::new(&gif[..]))
        .into_blocks()
        .map(|b| b.unwrap())
        .collect();
    crit.bench_function("encode_blocks", |b| {
        b.iter(|| {
            let mut encoder =
                Encoder::new(Cursor::new(black_box(Vec::with_capacity(32768))))
                    .into_block_enc();
            for block in &blocks {
                encoder.encode(black_box(block.clone())).unwrap();
            }
        })
    });
}

fn encode_steps(crit: &mut Criterion) {
    let steps = steps();
    crit.bench_function("encode_steps", |b| {
        b.iter(|| {
            let mut buf = Vec::with_capacity(32768);
            let mut encoder = Encoder::new(&mut buf)
                .into_step_enc()
                .with_loop_count(0);
            encoder.encode_animation(black_box(&steps)).unwrap();
            drop(encoder);
            black_box(buf);
        })
    });
}

criterion_group!(benches, encode_blocks, encode_steps);
criterion_main!(benches);
