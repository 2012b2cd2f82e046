use raylab_core::WorkScheduler;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

#[test]
fn every_index_runs_exactly_once() {
    for &threads in &[1usize, 2, 8] {
        let scheduler = WorkScheduler::new(threads);
        for &count in &[0usize, 1, 1000] {
            for &chunk in &[1usize, 7, count] {
                let slots: Vec<AtomicU32> = (0..count).map(|_| AtomicU32::new(0)).collect();
                scheduler.parallel_for(count, chunk, |index| {
                    slots[index].fetch_add(1, Ordering::Relaxed);
                });
                for (index, slot) in slots.iter().enumerate() {
                    assert_eq!(
                        slot.load(Ordering::Relaxed),
                        1,
                        "index {index} (count {count}, chunk {chunk}, threads {threads})"
                    );
                }
            }
        }
    }
}

#[test]
fn results_do_not_depend_on_thread_count() {
    let count = 500;
    let run = |threads: usize| -> Vec<u64> {
        let slots: Vec<AtomicU32> = (0..count).map(|_| AtomicU32::new(0)).collect();
        WorkScheduler::new(threads).parallel_for(count, 3, |index| {
            let value = (index as u64).wrapping_mul(2654435761) as u32;
            slots[index].store(value, Ordering::Relaxed);
        });
        slots.iter().map(|s| s.load(Ordering::Relaxed) as u64).collect()
    };

    assert_eq!(run(1), run(8));
}

#[test]
fn two_dimensional_grid_is_covered_once() {
    let (width, height) = (13usize, 9usize);
    let slots: Vec<AtomicU32> = (0..width * height).map(|_| AtomicU32::new(0)).collect();

    WorkScheduler::new(4).parallel_for_2d((width, height), |x, y| {
        assert!(x < width && y < height);
        slots[y * width + x].fetch_add(1, Ordering::Relaxed);
    });

    for slot in &slots {
        assert_eq!(slot.load(Ordering::Relaxed), 1);
    }
}

#[test]
fn empty_domains_return_immediately() {
    let scheduler = WorkScheduler::new(8);
    let calls = AtomicUsize::new(0);
    scheduler.parallel_for(0, 16, |_| {
        calls.fetch_add(1, Ordering::Relaxed);
    });
    scheduler.parallel_for_2d((0, 10), |_, _| {
        calls.fetch_add(1, Ordering::Relaxed);
    });
    scheduler.parallel_for_2d((10, 0), |_, _| {
        calls.fetch_add(1, Ordering::Relaxed);
    });
    assert_eq!(calls.load(Ordering::Relaxed), 0);
}

#[test]
fn chunk_larger_than_count_still_covers_everything() {
    let count = 5;
    let slots: Vec<AtomicU32> = (0..count).map(|_| AtomicU32::new(0)).collect();
    WorkScheduler::new(8).parallel_for(count, 64, |index| {
        slots[index].fetch_add(1, Ordering::Relaxed);
    });
    for slot in &slots {
        assert_eq!(slot.load(Ordering::Relaxed), 1);
    }
}

#[test]
fn default_thread_count_is_positive() {
    assert!(WorkScheduler::new(0).threads() >= 1);
}
