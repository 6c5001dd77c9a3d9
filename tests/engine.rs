mod tests {
    use std::collections::HashMap;

    use embassy_time::{Duration, Instant};
    use rgb_fx_engine::color::{BlendMode, ColorHsl};
    use rgb_fx_engine::control::StateStore;
    use rgb_fx_engine::effect::{
        CompositeEffect, ControlGroupConfig, ControlGroupEffect, EffectSlot, EffectTree, FxId,
        RippleConfig, RippleEffect, StaticConfig, StaticEffect,
    };
    use rgb_fx_engine::{
        ActivityState, CURRENT_ZONE, ConnectivityStatus, ControlCommand, Engine, EngineConfig,
        FxError, FxEvent, FxIntent, IntentChannel, PixelLayout, PixelSink, Rgb, SchedulerState,
    };

    const PIXELS: &[usize] = &[0, 1, 2, 3];
    const RED: &[ColorHsl] = &[ColorHsl::new(0, 100, 50)];
    const GREEN: ColorHsl = ColorHsl::new(120, 100, 50);

    const LAYOUT: PixelLayout = PixelLayout {
        positions: &[(0, 0), (10, 0), (20, 0), (30, 0)],
        key_pixels: &[0, 1, 2, 3],
        segments: &[2, 2],
    };

    #[derive(Default)]
    struct RecordingSink {
        updates: Vec<(usize, Vec<Rgb>)>,
    }

    impl RecordingSink {
        /// Pixels of the latest frame, segments joined in order
        fn last_frame(&self) -> Vec<(u8, u8, u8)> {
            let start = self.updates.len().saturating_sub(2);
            self.updates[start..]
                .iter()
                .flat_map(|(_, colors)| colors.iter().map(|c| (c.r, c.g, c.b)))
                .collect()
        }
    }

    impl PixelSink for RecordingSink {
        fn update(&mut self, segment: usize, colors: &[Rgb]) {
            self.updates.push((segment, colors.to_vec()));
        }
    }

    #[derive(Default)]
    struct MemoryStore {
        records: HashMap<String, Vec<u8>>,
    }

    impl StateStore for MemoryStore {
        fn load(&mut self, key: &str, buf: &mut [u8]) -> Option<usize> {
            let record = self.records.get(key)?;
            let len = record.len().min(buf.len());
            buf[..len].copy_from_slice(&record[..len]);
            Some(record.len())
        }

        fn save(&mut self, key: &str, record: &[u8]) {
            self.records.insert(key.into(), record.to_vec());
        }
    }

    type TestEngine<'a> = Engine<'a, RecordingSink, MemoryStore, 4, 8>;

    /// Zone 0 "base" holds a red backdrop with four brightness steps, zone 1
    /// "keys" a green ripple. The root layers keys over base.
    fn build_tree() -> (EffectTree, FxId) {
        let mut tree = EffectTree::new();

        let backdrop = StaticEffect::new(&StaticConfig {
            pixels: PIXELS,
            colors: RED,
            blend: BlendMode::Normal,
        })
        .unwrap();
        let backdrop = tree.add(EffectSlot::Static(backdrop)).unwrap();

        let ripple = RippleEffect::new(&RippleConfig {
            pixels: PIXELS,
            color: GREEN,
            blend: BlendMode::Normal,
            buffer_size: 4,
            duration: Duration::from_millis(1000),
            ripple_width: 20,
        })
        .unwrap();
        let ripple = tree.add(EffectSlot::Ripple(ripple)).unwrap();

        let base = tree
            .add(EffectSlot::ControlGroup(
                ControlGroupEffect::new(
                    ControlGroupConfig::new("base").with_brightness_steps(4),
                    &[backdrop],
                )
                .unwrap(),
            ))
            .unwrap();
        let keys = tree
            .add(EffectSlot::ControlGroup(
                ControlGroupEffect::new(ControlGroupConfig::new("keys"), &[ripple]).unwrap(),
            ))
            .unwrap();

        let root = tree
            .add(EffectSlot::Composite(
                CompositeEffect::new(&[base, keys]).unwrap(),
            ))
            .unwrap();

        (tree, root)
    }

    fn engine<'a>(channel: &'a IntentChannel<8>, store: MemoryStore) -> TestEngine<'a> {
        let (tree, root) = build_tree();
        Engine::new(
            channel.receiver(),
            RecordingSink::default(),
            store,
            tree,
            root,
            &EngineConfig::new(LAYOUT),
        )
    }

    #[test]
    fn test_start_renders_every_segment() {
        let channel = IntentChannel::new();
        let mut engine = engine(&channel, MemoryStore::default());
        let now = Instant::from_millis(0);

        let idle = engine.tick(now);
        assert!(!idle.rendered);
        assert_eq!(idle.next_deadline, None);

        engine.start(now);
        let result = engine.tick(now);
        assert!(result.rendered);
        assert_eq!(result.next_deadline, None);
        assert_eq!(engine.scheduler().state(), SchedulerState::Idle);

        let updates = &engine.sink().updates;
        assert_eq!(updates.len(), 2);
        assert_eq!(updates[0].0, 0);
        assert_eq!(updates[0].1.len(), 2);
        assert_eq!(updates[1].0, 1);
        assert_eq!(updates[1].1.len(), 2);
        assert_eq!(engine.sink().last_frame(), vec![(255, 0, 0); 4]);
    }

    #[test]
    fn test_command_dims_and_saves_after_debounce() {
        let channel = IntentChannel::new();
        let mut engine = engine(&channel, MemoryStore::default());
        let now = Instant::from_millis(0);
        engine.start(now);
        engine.tick(now);

        channel
            .sender()
            .try_send(ControlCommand::dim(CURRENT_ZONE).into())
            .unwrap();
        let later = now + Duration::from_millis(100);
        let result = engine.tick(later);

        assert!(result.rendered);
        assert_eq!(engine.sink().last_frame(), vec![(191, 0, 0); 4]);

        let save_at = later + Duration::from_secs(60);
        assert_eq!(result.next_deadline, Some(save_at));
        assert_eq!(result.sleep_duration, Some(Duration::from_secs(60)));
        assert!(engine.store().records.is_empty());

        engine.tick(save_at);
        assert_eq!(engine.store().records.get("base"), Some(&vec![1u8, 3, 0]));
        assert_eq!(engine.tree().save_deadline(), None);
    }

    #[test]
    fn test_restores_persisted_state() {
        let mut store = MemoryStore::default();
        store.records.insert("base".into(), vec![1, 2, 0]);
        store.records.insert("keys".into(), vec![9, 9, 9]);

        let channel = IntentChannel::new();
        let mut engine = engine(&channel, store);
        let now = Instant::from_millis(0);

        assert_eq!(engine.tree().control_group(0).unwrap().state().brightness, 2);
        assert_eq!(engine.tree().control_group(1).unwrap().state().brightness, 10);

        engine.start(now);
        engine.tick(now);
        assert_eq!(engine.sink().last_frame(), vec![(128, 0, 0); 4]);
    }

    #[test]
    fn test_zone_cursor() {
        let channel = IntentChannel::new();
        let mut engine = engine(&channel, MemoryStore::default());
        let now = Instant::from_millis(0);
        assert_eq!(engine.zones().count(), 2);

        engine
            .handle_command(ControlCommand::next_zone(), now)
            .unwrap();
        assert_eq!(engine.zones().current(), 1);

        engine
            .handle_command(ControlCommand::toggle(CURRENT_ZONE), now)
            .unwrap();
        assert!(!engine.tree().control_group(1).unwrap().state().active);
        assert!(engine.tree().control_group(0).unwrap().state().active);

        engine
            .handle_command(ControlCommand::next_zone(), now)
            .unwrap();
        assert_eq!(engine.zones().current(), 0);
        engine
            .handle_command(ControlCommand::previous_zone(), now)
            .unwrap();
        assert_eq!(engine.zones().current(), 1);

        assert_eq!(
            engine.handle_command(ControlCommand::toggle(5), now),
            Err(FxError::Unsupported)
        );
        assert_eq!(
            engine.handle_command(ControlCommand::select(0, 1), now),
            Err(FxError::Unsupported)
        );
    }

    #[test]
    fn test_failed_command_does_not_block_queue() {
        let channel = IntentChannel::new();
        let mut engine = engine(&channel, MemoryStore::default());
        let now = Instant::from_millis(0);
        let sender = channel.sender();

        sender.try_send(ControlCommand::toggle(7).into()).unwrap();
        sender.try_send(ControlCommand::toggle(0).into()).unwrap();
        engine.tick(now);

        assert!(channel.is_empty());
        assert!(!engine.tree().control_group(0).unwrap().state().active);
    }

    #[test]
    fn test_key_press_spawns_ripple() {
        let channel = IntentChannel::new();
        let mut engine = engine(&channel, MemoryStore::default());
        let now = Instant::from_millis(0);
        engine.start(now);
        engine.tick(now);

        engine.handle_event(
            FxEvent::KeyPosition {
                position: 0,
                pressed: false,
            },
            now,
        );
        assert!(!engine.device().wpm.is_running());

        channel
            .sender()
            .try_send(FxIntent::Event(FxEvent::KeyPosition {
                position: 0,
                pressed: true,
            }))
            .unwrap();
        let result = engine.tick(now);

        assert!(result.rendered);
        assert!(engine.device().wpm.is_running());
        assert_eq!(engine.scheduler().countdown(), 31);

        let frame = engine.sink().last_frame();
        assert_eq!(frame[0], (0, 255, 0));
        assert_eq!(frame[1].0, 0);
        assert!(frame[1].1 > 0 && frame[1].1 < 255);
        assert_eq!(frame[2], (255, 0, 0));
        assert_eq!(frame[3], (255, 0, 0));
    }

    #[test]
    fn test_sleep_and_wake() {
        let channel = IntentChannel::new();
        let mut engine = engine(&channel, MemoryStore::default());
        let now = Instant::from_millis(0);
        engine.start(now);

        engine.handle_event(FxEvent::Activity(ActivityState::Sleep), now);
        assert_eq!(engine.scheduler().state(), SchedulerState::Idle);
        assert!(!engine.tick(now).rendered);

        engine.handle_event(FxEvent::KeyPosition { position: 0, pressed: true }, now);
        assert_eq!(engine.scheduler().countdown(), 0);

        engine.handle_event(FxEvent::Activity(ActivityState::Idle), now);
        assert_eq!(engine.scheduler().state(), SchedulerState::Idle);

        engine.handle_event(FxEvent::Activity(ActivityState::Active), now);
        assert!(engine.tick(now).rendered);
    }

    #[test]
    fn test_battery_level_requests_frame() {
        let channel = IntentChannel::new();
        let mut engine = engine(&channel, MemoryStore::default());
        let now = Instant::from_millis(0);

        engine.handle_event(FxEvent::BatteryLevel(150), now);
        assert_eq!(engine.device().battery_level(), 100);
        assert_eq!(engine.scheduler().countdown(), 1);
    }

    #[test]
    fn test_connectivity_blink_deadline() {
        let channel = IntentChannel::new();
        let mut engine = engine(&channel, MemoryStore::default());
        let now = Instant::from_millis(0);

        engine.handle_event(
            FxEvent::Connectivity(ConnectivityStatus::connecting(0)),
            now,
        );
        let result = engine.tick(now);
        assert!(result.rendered);
        assert_eq!(result.next_deadline, Some(now + Duration::from_millis(200)));
        assert_eq!(result.sleep_duration, Some(Duration::from_millis(200)));

        let blink = engine.tick(now + Duration::from_millis(200));
        assert!(blink.rendered);
        assert!(!engine.device().connectivity.indicator_on());
        assert_eq!(blink.next_deadline, Some(now + Duration::from_millis(400)));
    }
}
