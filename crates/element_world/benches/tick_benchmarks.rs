use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use element_world::{ElementWorld, EngineConfig, SimRng, elements};

const SIZES: &[u32] = &[128, 256, 512];
const CHUNK_SIZES: &[u32] = &[16, 32, 64];

fn sand_rain(size: u32, chunk_size: u32) -> ElementWorld {
  let mut world = ElementWorld::new(EngineConfig {
    width: size,
    height: size,
    chunk_size,
    seed: 0xBEEF,
    ..Default::default()
  })
  .unwrap();

  for x in 0..size {
    let floor = elements::stone(world.rng_mut());
    world.set(x, size - 1, floor);
  }
  // Top third full of alternating sand and water columns.
  for y in 0..size / 3 {
    for x in 0..size {
      let cell = if (x / 8) % 2 == 0 {
        elements::sand(world.rng_mut())
      } else {
        elements::water(world.rng_mut())
      };
      world.set(x, y, cell);
    }
  }
  world
}

fn bench_tick(c: &mut Criterion) {
  let mut group = c.benchmark_group("tick");

  for &size in SIZES {
    group.throughput(Throughput::Elements(size as u64 * size as u64));

    for &chunk_size in CHUNK_SIZES {
      let id = BenchmarkId::new(format!("world_{size}"), format!("chunk_{chunk_size}"));
      group.bench_with_input(id, &(size, chunk_size), |b, &(size, chunk_size)| {
        let mut world = sand_rain(size, chunk_size);
        b.iter(|| world.tick());
      });
    }
  }

  group.finish();
}

fn bench_settled(c: &mut Criterion) {
  let mut group = c.benchmark_group("settled");
  let size = 256u32;
  group.throughput(Throughput::Elements(size as u64 * size as u64));

  // Once everything has come to rest most chunks sleep.
  let mut world = sand_rain(size, 32);
  for _ in 0..2000 {
    world.tick();
  }
  group.bench_function("world_256", |b| {
    b.iter(|| world.tick());
  });

  group.finish();
}

fn bench_snapshot(c: &mut Criterion) {
  let mut group = c.benchmark_group("snapshot");
  let world = sand_rain(512, 32);
  let snapshot = world.export_snapshot();
  group.throughput(Throughput::Bytes((snapshot.heads.len() + snapshot.tails.len()) as u64));

  for compress in [false, true] {
    let id = BenchmarkId::new("encode", if compress { "lz4" } else { "raw" });
    group.bench_with_input(id, &compress, |b, &compress| {
      b.iter(|| snapshot.to_bytes(compress).unwrap());
    });
  }

  let bytes = snapshot.to_bytes(true).unwrap();
  group.bench_function("decode/lz4", |b| {
    b.iter(|| element_world::WorldSnapshot::from_bytes(&bytes).unwrap());
  });

  group.finish();
}

fn bench_rng(c: &mut Criterion) {
  c.bench_function("rng/chance", |b| {
    let mut rng = SimRng::new(7);
    b.iter(|| rng.chance(0.3));
  });
}

criterion_group!(benches, bench_tick, bench_settled, bench_snapshot, bench_rng);
criterion_main!(benches);
