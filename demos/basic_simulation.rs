use tetsim::*;

fn main() -> TetSimResult<()> {
    let params = PhysicsParams::default();
    let mut world = PhysicsWorld::new(params)?;
    world.set_parallel_enabled(true);

    let mesh = TetMesh::block(Vec3::new(0.0, 1.5, 0.0), Vec3::splat(0.4), 4);
    let id = world.add_body(&mesh)?;

    for frame in 0..120 {
        world.step_frame();
        if frame % 20 == 0 {
            if let Some(body) = world.body(id) {
                let lowest = body
                    .positions()
                    .iter()
                    .map(|p| p.y)
                    .fold(f32::INFINITY, f32::min);
                println!(
                    "frame {frame:3}: lowest y = {lowest:.4}, volume error = {:.6}",
                    body.volume_error()
                );
            }
        }
    }

    world.report_profile();
    Ok(())
}
