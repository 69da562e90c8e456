use std::sync::{Arc, Mutex};
use std::thread;
use tetsim::*;

#[test]
fn test_physics_world_is_sync_and_send() {
    fn assert_sync_send<T: Sync + Send>() {}
    assert_sync_send::<PhysicsWorld>();
    assert_sync_send::<SoftBody>();
}

#[test]
fn test_shared_physics_world_across_threads() {
    let mut world = PhysicsWorld::default();
    let id = world
        .add_body(&TetMesh::cube(Vec3::new(0.0, 1.0, 0.0), 0.25))
        .unwrap();
    let world = Arc::new(Mutex::new(world));

    let mut handles = vec![];
    for _ in 0..4 {
        let world_clone = Arc::clone(&world);
        let handle = thread::spawn(move || {
            let mut world = world_clone.lock().unwrap();
            world.step_frame();
        });
        handles.push(handle);
    }

    for handle in handles {
        handle.join().unwrap();
    }

    let world = world.lock().unwrap();
    assert_eq!(world.frame_count(), 4);
    assert!(world.body(id).unwrap().positions().iter().all(|p| p.is_finite()));
}
