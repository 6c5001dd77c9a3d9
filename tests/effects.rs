mod tests {
    use embassy_time::{Duration, Instant};
    use rgb_fx_engine::color::{BlendMode, ColorHsl, ColorRgb};
    use rgb_fx_engine::device::CONNECTING_BLINK_PERIOD;
    use rgb_fx_engine::effect::{
        BatteryGaugeConfig, BatteryGaugeEffect, ConnectivityIndicatorConfig,
        ConnectivityIndicatorEffect, Effect, FxContext, GaugeAxis, GaugeBar, GaugeConfig,
        GaugeEffect, GaugeSource, LinearGradientConfig, LinearGradientEffect, SolidConfig,
        SolidEffect, StaticConfig, StaticEffect, WpmIndicatorConfig, WpmIndicatorEffect,
    };
    use rgb_fx_engine::{
        ConnectivityStatus, DeviceState, FrameScheduler, FxError, MAX_PIXELS, Pixel,
    };

    const RED: ColorHsl = ColorHsl::new(0, 100, 50);
    const YELLOW: ColorHsl = ColorHsl::new(60, 100, 50);
    const GREEN: ColorHsl = ColorHsl::new(120, 100, 50);
    const BLUE: ColorHsl = ColorHsl::new(240, 100, 50);

    const ROW: &[usize] = &[0, 1, 2, 3];

    fn row() -> [Pixel; 4] {
        [
            Pixel::new(0, 0),
            Pixel::new(25, 0),
            Pixel::new(50, 0),
            Pixel::new(95, 0),
        ]
    }

    fn approx(a: ColorRgb, b: ColorRgb) -> bool {
        (a.r - b.r).abs() < 1e-4 && (a.g - b.g).abs() < 1e-4 && (a.b - b.b).abs() < 1e-4
    }

    #[test]
    fn test_static_colors_per_pixel() {
        const COLORS: &[ColorHsl] = &[RED, GREEN];
        let mut effect = StaticEffect::new(&StaticConfig {
            pixels: &[3, 0, 1],
            colors: COLORS,
            blend: BlendMode::Normal,
        })
        .unwrap();

        let mut frames = FrameScheduler::new();
        let device = DeviceState::new();
        let mut ctx = FxContext::new(Instant::from_millis(0), &mut frames, &device);
        let mut pixels = row();
        effect.render_frame(&mut pixels, &mut ctx);

        assert!(approx(pixels[3].value, RED.to_rgb()));
        assert!(approx(pixels[0].value, GREEN.to_rgb()));
        assert!(approx(pixels[1].value, GREEN.to_rgb()));
        assert_eq!(pixels[2].value, ColorRgb::BLACK);

        effect.start(&mut ctx);
        assert_eq!(ctx.frames.countdown(), 1);
    }

    #[test]
    fn test_static_oversized_pixel_map_rejected() {
        static WIDE: [usize; MAX_PIXELS + 1] = [0; MAX_PIXELS + 1];
        let effect = StaticEffect::new(&StaticConfig {
            pixels: &WIDE,
            colors: &[RED],
            blend: BlendMode::Normal,
        });
        assert_eq!(effect.err(), Some(FxError::ResourceExhausted));
    }

    #[test]
    fn test_solid_single_color_is_static() {
        const COLORS: &[ColorHsl] = &[BLUE];
        let mut effect = SolidEffect::new(&SolidConfig {
            pixels: ROW,
            colors: COLORS,
            duration: Duration::from_secs(1),
        });

        let mut frames = FrameScheduler::new();
        let device = DeviceState::new();
        let mut ctx = FxContext::new(Instant::from_millis(0), &mut frames, &device);
        let mut pixels = row();
        effect.render_frame(&mut pixels, &mut ctx);

        assert!(approx(pixels[0].value, BLUE.to_rgb()));
        assert_eq!(ctx.frames.countdown(), 0);
    }

    #[test]
    fn test_solid_cycles_palette() {
        const COLORS: &[ColorHsl] = &[RED, GREEN];
        let mut effect = SolidEffect::new(&SolidConfig {
            pixels: ROW,
            colors: COLORS,
            duration: Duration::from_secs(1),
        });

        let mut frames = FrameScheduler::new();
        let device = DeviceState::new();
        let mut ctx = FxContext::new(Instant::from_millis(0), &mut frames, &device);
        let mut pixels = row();

        effect.render_frame(&mut pixels, &mut ctx);
        assert!(approx(pixels[0].value, RED.to_rgb()));
        assert_eq!(ctx.frames.countdown(), 30);

        for _ in 1..16 {
            effect.render_frame(&mut pixels, &mut ctx);
        }
        assert!(approx(effect.current_color(), GREEN.to_rgb()));

        for _ in 16..31 {
            effect.render_frame(&mut pixels, &mut ctx);
        }
        assert!(approx(effect.current_color(), RED.to_rgb()));
        assert_eq!(ctx.frames.countdown(), 30);
    }

    #[test]
    fn test_linear_gradient() {
        const COLORS: &[ColorHsl] = &[RED, BLUE];
        let mut effect = LinearGradientEffect::new(&LinearGradientConfig {
            pixels: ROW,
            colors: COLORS,
            blend: BlendMode::Normal,
            angle: 0,
            gradient_width: 100,
            duration: Duration::from_ticks(0),
            rgb_interpolation: true,
        });

        let mut frames = FrameScheduler::new();
        let device = DeviceState::new();
        let mut ctx = FxContext::new(Instant::from_millis(0), &mut frames, &device);
        let mut pixels = row();
        effect.render_frame(&mut pixels, &mut ctx);

        assert!(approx(pixels[0].value, ColorRgb::new(1.0, 0.0, 0.0)));
        assert!(approx(pixels[1].value, ColorRgb::new(0.5, 0.0, 0.5)));
        assert!(approx(pixels[2].value, ColorRgb::new(0.0, 0.0, 1.0)));
        assert!(approx(pixels[3].value, ColorRgb::new(0.9, 0.0, 0.1)));
        assert_eq!(ctx.frames.countdown(), 0);
    }

    #[test]
    fn test_linear_gradient_scrolls() {
        const COLORS: &[ColorHsl] = &[RED, BLUE];
        let mut effect = LinearGradientEffect::new(&LinearGradientConfig {
            pixels: ROW,
            colors: COLORS,
            blend: BlendMode::Normal,
            angle: 90,
            gradient_width: 60,
            duration: Duration::from_secs(2),
            rgb_interpolation: false,
        });

        let mut frames = FrameScheduler::new();
        let device = DeviceState::new();
        let mut ctx = FxContext::new(Instant::from_millis(0), &mut frames, &device);
        let mut pixels = row();

        effect.render_frame(&mut pixels, &mut ctx);
        assert_eq!(ctx.frames.countdown(), 1);
        assert!((effect.offset() - 1.0).abs() < 1e-5);

        for _ in 0..60 {
            effect.render_frame(&mut pixels, &mut ctx);
        }
        assert!(effect.offset() < 60.0);
    }

    #[test]
    fn test_gauge_bar_edge() {
        let bar = GaugeBar {
            bounds_min: 0,
            bounds_max: 100,
            axis: GaugeAxis::Horizontal,
            edge_width: 10,
        };
        let mut pixels = [
            Pixel::new(0, 0),
            Pixel::new(50, 0),
            Pixel::new(95, 0),
        ];
        for pixel in &mut pixels {
            pixel.value = ColorRgb::WHITE;
        }

        bar.render(&mut pixels, &[0, 1, 2], 0.5, ColorRgb::WHITE, BlendMode::Normal);

        assert_eq!(pixels[0].value, ColorRgb::WHITE);
        assert!(approx(pixels[1].value, ColorRgb::new(0.5, 0.5, 0.5)));
        assert_eq!(pixels[2].value, ColorRgb::BLACK);
    }

    #[test]
    fn test_gauge_bar_reversed_vertical() {
        let bar = GaugeBar {
            bounds_min: 100,
            bounds_max: 0,
            axis: GaugeAxis::Vertical,
            edge_width: 0,
        };
        let mut pixels = [Pixel::new(0, 90), Pixel::new(0, 10)];

        bar.render(&mut pixels, &[0, 1], 0.5, ColorRgb::WHITE, BlendMode::Normal);

        assert_eq!(pixels[0].value, ColorRgb::WHITE);
        assert_eq!(pixels[1].value, ColorRgb::BLACK);
    }

    #[test]
    fn test_gauge_reads_battery() {
        const COLORS: &[ColorHsl] = &[RED, GREEN];
        let mut effect = GaugeEffect::new(GaugeConfig {
            pixels: ROW,
            colors: COLORS,
            blend: BlendMode::Normal,
            bar: GaugeBar {
                bounds_min: 0,
                bounds_max: 100,
                axis: GaugeAxis::Horizontal,
                edge_width: 0,
            },
            source: GaugeSource::Battery,
            value_min: 0,
            value_max: 100,
        });
        assert_eq!(effect.step_for(150.0), 1.0);
        assert_eq!(effect.step_for(25.0), 0.25);

        let mut frames = FrameScheduler::new();
        let mut device = DeviceState::new();
        device.set_battery_level(60);
        let mut ctx = FxContext::new(Instant::from_millis(0), &mut frames, &device);
        let mut pixels = row();
        effect.render_frame(&mut pixels, &mut ctx);

        let color = ColorHsl::new(72, 100, 50).to_rgb();
        assert!(approx(pixels[2].value, color));
        assert_eq!(pixels[3].value, ColorRgb::BLACK);
        assert_eq!(ctx.frames.countdown(), 0);
    }

    #[test]
    fn test_battery_gauge_thresholds() {
        const COLORS: &[ColorHsl] = &[RED, YELLOW, GREEN];
        let effect = BatteryGaugeEffect::new(&BatteryGaugeConfig {
            pixels: ROW,
            colors: COLORS,
            thresholds: &[20, 50, 80],
            blend: BlendMode::Normal,
            bar: GaugeBar {
                bounds_min: 0,
                bounds_max: 100,
                axis: GaugeAxis::Horizontal,
                edge_width: 0,
            },
        });

        assert!(approx(effect.base_color(10), RED.to_rgb()));
        assert!(approx(effect.base_color(50), RED.to_rgb()));
        assert!(approx(effect.base_color(60), YELLOW.to_rgb()));
        assert!(approx(effect.base_color(100), GREEN.to_rgb()));
    }

    #[test]
    fn test_battery_gauge_fill() {
        const COLORS: &[ColorHsl] = &[RED, GREEN];
        let mut effect = BatteryGaugeEffect::new(&BatteryGaugeConfig {
            pixels: ROW,
            colors: COLORS,
            thresholds: &[0, 50],
            blend: BlendMode::Normal,
            bar: GaugeBar {
                bounds_min: 0,
                bounds_max: 100,
                axis: GaugeAxis::Horizontal,
                edge_width: 0,
            },
        });

        let mut frames = FrameScheduler::new();
        let mut device = DeviceState::new();
        device.set_battery_level(40);
        let mut ctx = FxContext::new(Instant::from_millis(0), &mut frames, &device);
        let mut pixels = row();
        effect.render_frame(&mut pixels, &mut ctx);

        assert!(approx(pixels[1].value, RED.to_rgb()));
        assert_eq!(pixels[2].value, ColorRgb::BLACK);
    }

    #[test]
    fn test_wpm_indicator_idle() {
        const COLORS: &[ColorHsl] = &[GREEN, RED];
        let mut effect = WpmIndicatorEffect::new(&WpmIndicatorConfig {
            pixels: ROW,
            colors: COLORS,
            blend: BlendMode::Normal,
            bar: GaugeBar {
                bounds_min: 0,
                bounds_max: 100,
                axis: GaugeAxis::Horizontal,
                edge_width: 0,
            },
            max_wpm: 100,
        });

        let mut frames = FrameScheduler::new();
        let device = DeviceState::new();
        let mut ctx = FxContext::new(Instant::from_millis(0), &mut frames, &device);
        let mut pixels = row();
        for pixel in &mut pixels {
            pixel.value = ColorRgb::WHITE;
        }
        effect.render_frame(&mut pixels, &mut ctx);

        assert!(pixels.iter().all(|pixel| pixel.value == ColorRgb::BLACK));
        assert_eq!(ctx.frames.countdown(), 0);
    }

    #[test]
    fn test_wpm_indicator_animates_while_typing() {
        const COLORS: &[ColorHsl] = &[GREEN];
        let mut effect = WpmIndicatorEffect::new(&WpmIndicatorConfig {
            pixels: ROW,
            colors: COLORS,
            blend: BlendMode::Normal,
            bar: GaugeBar {
                bounds_min: 0,
                bounds_max: 100,
                axis: GaugeAxis::Horizontal,
                edge_width: 0,
            },
            max_wpm: 74,
        });

        let mut frames = FrameScheduler::new();
        let mut device = DeviceState::new();
        for _ in 0..5 {
            device.wpm.on_key_press(Instant::from_millis(0));
        }
        device.wpm.poll(Instant::from_millis(300), &mut frames);
        frames.stop();

        let mut ctx = FxContext::new(Instant::from_millis(600), &mut frames, &device);
        let mut pixels = row();
        effect.render_frame(&mut pixels, &mut ctx);

        assert!(approx(pixels[0].value, GREEN.to_rgb()));
        assert!(approx(pixels[1].value, GREEN.to_rgb()));
        assert_eq!(pixels[2].value, ColorRgb::BLACK);
        assert_eq!(ctx.frames.countdown(), 1);
    }

    fn indicator(profile_index: u8, no_blink: bool) -> ConnectivityIndicatorEffect {
        ConnectivityIndicatorEffect::new(&ConnectivityIndicatorConfig {
            pixels: &[0],
            backdrop_pixels: &[1],
            profile_index,
            connected: GREEN,
            pairing: BLUE,
            connecting: YELLOW,
            backdrop: RED,
            blend: BlendMode::Normal,
            no_blink,
        })
    }

    #[test]
    fn test_connectivity_indicator() {
        let mut frames = FrameScheduler::new();
        let mut device = DeviceState::new();
        let start = Instant::from_millis(0);
        device
            .connectivity
            .update(ConnectivityStatus::connecting(1), start, &mut frames);

        let mut selected = indicator(1, false);
        let mut steady = indicator(1, true);
        let mut other = indicator(0, false);

        let mut ctx = FxContext::new(start, &mut frames, &device);
        let mut pixels = row();
        other.render_frame(&mut pixels, &mut ctx);
        assert_eq!(pixels[0].value, ColorRgb::BLACK);
        assert_eq!(pixels[1].value, ColorRgb::BLACK);

        selected.render_frame(&mut pixels, &mut ctx);
        assert!(approx(pixels[0].value, YELLOW.to_rgb()));
        assert!(approx(pixels[1].value, RED.to_rgb()));

        let blink = start + CONNECTING_BLINK_PERIOD;
        device.connectivity.poll(blink, &mut frames);
        assert!(!device.connectivity.indicator_on());

        let mut ctx = FxContext::new(blink, &mut frames, &device);
        let mut pixels = row();
        selected.render_frame(&mut pixels, &mut ctx);
        assert_eq!(pixels[0].value, ColorRgb::BLACK);
        assert!(approx(pixels[1].value, RED.to_rgb()));

        steady.render_frame(&mut pixels, &mut ctx);
        assert!(approx(pixels[0].value, YELLOW.to_rgb()));
    }

    #[test]
    fn test_connectivity_colors() {
        let mut frames = FrameScheduler::new();
        let mut device = DeviceState::new();
        let now = Instant::from_millis(0);
        let mut effect = indicator(2, true);

        for (status, color) in [
            (ConnectivityStatus::connected(2), GREEN),
            (ConnectivityStatus::pairing(2), BLUE),
            (ConnectivityStatus::connecting(2), YELLOW),
        ] {
            device.connectivity.update(status, now, &mut frames);
            let mut ctx = FxContext::new(now, &mut frames, &device);
            let mut pixels = row();
            effect.render_frame(&mut pixels, &mut ctx);
            assert!(approx(pixels[0].value, color.to_rgb()), "{status:?}");
        }

        device
            .connectivity
            .update(ConnectivityStatus::inactive(), now, &mut frames);
        let mut ctx = FxContext::new(now, &mut frames, &device);
        let mut pixels = row();
        effect.render_frame(&mut pixels, &mut ctx);
        assert_eq!(pixels[1].value, ColorRgb::BLACK);
    }
}
