//! # Particle Demo
//!
//! End-to-end walkthrough of a columnar store: declaration, row access,
//! partial iteration and a custom allocation strategy, verified with
//! assertions at every step.
//!
//! Run with: cargo run --bin particle_demo

use std::alloc::Layout;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use lanes::{columnar, AllocError, RawAlloc, MIN_ALIGN};

/// Demo purpose position type, aligned like a SIMD register.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[repr(C, align(16))]
pub struct Vector3 {
    x: f32,
    y: f32,
    z: f32,
    w: f32,
}

impl Vector3 {
    const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z, w: 0.0 }
    }
}

/// Small helper type to check when clones are performed.
#[derive(Debug, Default)]
pub struct CloneProbe {
    cloned: bool,
}

impl Clone for CloneProbe {
    fn clone(&self) -> Self {
        Self { cloned: true }
    }
}

columnar! {
    /// One column per particle attribute.
    pub struct Particles {
        position: Vector3,
        num_items: i32,
        life: f32,
        name: String,
        probe: CloneProbe,
    }
}

/// Allocation strategy that tracks live allocations, shared across all
/// columns through an `Arc`.
#[derive(Debug, Default)]
struct TrackingStrategy {
    live: AtomicUsize,
    total: AtomicUsize,
}

#[allow(unsafe_code)]
impl RawAlloc for TrackingStrategy {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        self.live.fetch_add(1, Ordering::Relaxed);
        self.total.fetch_add(1, Ordering::Relaxed);
        // SAFETY: column layouts are never zero-sized.
        let ptr = unsafe { std::alloc::alloc(layout) };
        NonNull::new(ptr).ok_or_else(|| AllocError::new(layout))
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        self.live.fetch_sub(1, Ordering::Relaxed);
        // SAFETY: paired with an earlier allocate for the same layout.
        unsafe { std::alloc::dealloc(ptr.as_ptr(), layout) };
    }

    fn same_instance(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}

#[allow(clippy::too_many_lines)]
fn main() {
    // Create an empty store, and one backed by a custom strategy.
    let mut particles = Particles::new();
    let strategy = Arc::new(TrackingStrategy::default());
    let mut tracked = Particles::new_in(Arc::clone(&strategy));

    // Interface is close to Vec.
    assert_eq!(particles.len(), 0);
    assert!(particles.is_empty());

    // All operations apply to every column.
    particles.reserve(10);
    assert!(particles.capacity() >= 10);

    // Push a row as a list of values matching the field list.
    particles.push(
        Vector3::new(1.0, 2.0, 3.0),
        4,
        5.0,
        "test name".to_string(),
        CloneProbe::default(),
    );
    assert_eq!(particles.len(), 1);

    // Access one field of one row through its marker type.
    let position = particles.at::<particles_fields::position>(0).unwrap();
    assert_eq!((position.x, position.y, position.z), (1.0, 2.0, 3.0));
    assert_eq!(*particles.at::<particles_fields::num_items>(0).unwrap(), 4);
    assert_eq!(*particles.at::<particles_fields::life>(0).unwrap(), 5.0);
    assert_eq!(particles.at::<particles_fields::name>(0).unwrap(), "test name");
    assert!(!particles.at::<particles_fields::probe>(0).unwrap().cloned);

    // An owned row clones every field out of the columns.
    let mut row = particles.value_at(0).unwrap();
    row.position.x = 8.0;
    assert!(row.probe.cloned);
    assert_eq!(particles.position()[0].x, 1.0);

    // A row view references the columns in place.
    let view = particles.mut_at(0).unwrap();
    view.position.x = 8.0;
    assert_eq!(particles.position()[0].x, 8.0);

    // Pushing a row or a view clones into the columns.
    particles.push_row(row.clone());
    assert!(particles.probe()[1].cloned);
    let front = ParticlesRow::from(particles.first().unwrap());
    particles.push_row(front);
    assert!(particles.probe()[2].cloned);

    // Insertion works the same way, from an index.
    particles.insert_row(particles.len(), row.clone());
    assert_eq!(particles.len(), 4);

    // Resize, truncating or filling from a row of defaults.
    particles.resize(3);
    assert_eq!(particles.len(), 3);
    particles.resize_with(5, row);
    assert!(particles.probe()[4].cloned);
    assert_eq!(particles.name()[4], "test name");

    // Erase reports the index where the next surviving row now lives.
    let next = particles.erase(0);
    assert_eq!(next, 0);
    assert_eq!(particles.len(), 4);

    let popped = particles.pop().unwrap();
    assert_eq!(popped.name, "test name");

    particles.insert(
        0,
        Vector3::new(11.0, 12.0, 13.0),
        14,
        15.0,
        "first name".to_string(),
        CloneProbe::default(),
    );
    assert!(!particles.probe()[0].cloned);

    // Whole-row iteration yields reference tuples in lockstep.
    let total_items: i32 = particles.iter().map(|p| *p.num_items).sum();
    assert_eq!(particles.iter().len(), particles.len());

    // Partial iteration touches only the selected columns, in the order
    // you name them.
    for (name, position) in
        particles.iter_fields::<(particles_fields::name, particles_fields::position)>()
    {
        assert!(!name.is_empty());
        assert!(position.w.abs() < f32::EPSILON);
    }

    // Mutable partial iteration, over distinct fields only.
    for (life, num_items) in
        particles.iter_fields_mut::<(particles_fields::life, particles_fields::num_items)>()
    {
        *life *= 0.5;
        *num_items += 1;
    }

    // The tracked store routes every column allocation through the shared
    // strategy, at cache-line alignment or better.
    for i in 0..1000 {
        tracked.push(
            Vector3::new(i as f32, 0.0, 0.0),
            i,
            1.0,
            format!("particle-{i}"),
            CloneProbe::default(),
        );
    }
    assert!(tracked.allocator().same_instance(&strategy));
    assert!(strategy.total.load(Ordering::Relaxed) > 0);

    let live_before_drop = strategy.live.load(Ordering::Relaxed);
    assert!(live_before_drop > 0);
    drop(tracked);
    assert_eq!(strategy.live.load(Ordering::Relaxed), 0);

    println!("particle_demo: all assertions passed");
    println!("  rows in scratch store : {}", particles.len());
    println!("  total item count      : {total_items}");
    println!("  min column alignment  : {MIN_ALIGN} bytes");
    println!(
        "  tracked allocations   : {} total, 0 live after drop",
        strategy.total.load(Ordering::Relaxed),
    );
}
