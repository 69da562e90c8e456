use tetsim::*;

fn main() -> TetSimResult<()> {
    let params = PhysicsParams::default().with_compliance(1e-4, 0.0);
    let mesh = TetMesh::block(Vec3::new(0.0, 0.5, 0.0), Vec3::new(0.6, 0.2, 0.2), 6);
    let mut body = SoftBody::new(&mesh, &params)?;

    // Settle on the floor before picking.
    for _ in 0..30 {
        body.step_frame(&params);
    }

    let pick = Vec3::new(0.6, 0.4, 0.0);
    let Some(index) = body.start_grab(pick) else {
        println!("nothing to grab");
        return Ok(());
    };
    println!("grabbed particle {index} at {:?}", body.positions()[index]);

    for frame in 0..90 {
        let t = frame as f32 / 90.0;
        body.move_grabbed(pick + Vec3::new(0.0, t * 1.5, t * 0.5));
        body.step_frame(&params);
    }
    println!(
        "dragged to {:?}, volume error {:.6}",
        body.positions()[index],
        body.volume_error()
    );

    body.end_grab();
    for _ in 0..60 {
        body.step_frame(&params);
    }
    println!("released, particle rests at {:?}", body.positions()[index]);
    Ok(())
}
