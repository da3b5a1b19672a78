use anyhow::Result;
use vgband::{band_lookup::Axis, CommandKey, GeometrySettings, Paint, Scene, ShapeGeometry};

fn print_geometry(index: usize, geometry: &ShapeGeometry) {
    println!("shape {}: {} curves, {:?}", index, geometry.curve_count(), geometry.meta);
    for (name, bands) in [("fill", &geometry.fill), ("line", &geometry.line)].iter() {
        let bands = match bands {
            Some(bands) => bands,
            None => continue,
        };
        for axis in Axis::all().iter().copied() {
            println!("  {} {:?}", name, axis);
            for (row, coord) in bands.lookup(axis).as_slice().iter().enumerate() {
                println!("    {:>8.2} {:?}", coord, bands.row(axis, row));
            }
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let mut scene = Scene::new();
    let rect = scene.draw_rect(10.0, 10.0, 80.0, 40.0, 8.0, 8.0);
    scene.fill();

    scene.set_line_color(Some(Paint::rgb(0.1, 0.2, 0.8)));
    scene.set_line_width(4.0);
    scene.move_to(0.0, 70.0);
    scene.curve_to(30.0, 40.0, 60.0, 100.0, 100.0, 70.0);
    scene.stroke();

    let settings = GeometrySettings::new();
    for (index, geometry) in scene.build_geometry(&settings)?.iter().enumerate() {
        print_geometry(index, geometry);
    }

    rect.borrow_mut().set_command_value(0, CommandKey::Width, 120.0);
    println!("after widening the rect: bounds {:?}", scene.bounds());
    println!("exact bounds {:?}", scene.exact_bounds());
    println!("changes {:?}", scene.fetch_changes(vgband::ChangeFlags::ANYTHING));
    print_geometry(0, &scene.build_geometry(&settings)?[0]);

    Ok(())
}
