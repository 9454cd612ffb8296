use terrain_camera::*;

fn main() {
    let screen = match ScreenSize::new(1600.0, 900.0) {
        Ok(screen) => screen,
        Err(e) => {
            eprintln!("Invalid screen: {}", e);
            return;
        }
    };
    let controller_result = CameraController::new(CameraSettings::default(), screen);

    let mut camera = CameraState::new(2300.0, -1850.0, 150.0);
    let indicator_settings = IndicatorSettings::default();
    let num_steps = 10;

    match controller_result {
        Ok(controller) => {
            println!("Initializing camera...");
            println!("  Settings:     {:?}", controller.settings());
            println!("  Screen:       {}x{}", screen.width, screen.height);
            println!("  Initial:      {}", camera);

            println!("\nHolding right arrow and dragging towards the upper-left corner...");
            let mut input = InputState::centered(screen);
            input.right = true;
            input.primary_down = true;
            input.mouse_x = 400.0;
            input.mouse_y = 225.0;
            for i in 0..num_steps {
                controller.update(&mut camera, &input);
                let indicator = Indicator::compute(&camera, &input, screen, &indicator_settings);
                println!(
                    "Step {:>2}: Camera: {}  Indicator tip: ({:.1}, {:.1}) scale {:.3}",
                    i + 1,
                    camera,
                    indicator.tip[0],
                    indicator.tip[1],
                    indicator.scale
                );
            }

            println!("\nScrolling up three notches...");
            let mut input = InputState::centered(screen);
            input.scroll_notches = 3;
            controller.update(&mut camera, &input);
            println!("Camera: {}", camera);

            println!("\nDepth cue alpha at normalized heights 0, 7.5, 15: {:.2}, {:.2}, {:.2}",
                depth_cue_alpha(0.0),
                depth_cue_alpha(7.5),
                depth_cue_alpha(15.0)
            );
        }
        Err(e) => {
            eprintln!("Failed to initialize camera controller: {:?}", e);
        }
    }
}
