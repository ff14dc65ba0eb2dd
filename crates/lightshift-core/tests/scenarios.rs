// Lightshift End-to-End Scenarios
//
// Typing scenarios played through the simulated keyboard pipeline:
// early hook -> tap / hold arbiter -> late hook -> action.
//
// Run with: cargo test --test scenarios

#[cfg(feature = "config")]
mod scenarios {
    use lightshift_core::keycode::{mod_tap, Keycode, Mods, KC_I, KC_NO, KC_R, KC_S, KC_T, MOD_LSFT, MOD_RSFT};
    use lightshift_core::sim::{parse_trace, Simulator};
    use lightshift_core::{
        Hand, Host, KeyPos, KeyRecord, KeyboardConfig, KeymapLookup, Lightshift, LightshiftConfig,
        ShiftState,
    };

    // =========================================================================
    // Test Helpers
    // =========================================================================

    // 3x10 unsplit board: columns 0-4 left hand, 5-9 right hand
    const BOARD: &str = r#"
[board]
rows = 3
cols = 10

[[layer]]
keys = [
    ["KC_1", "KC_2", "KC_3", "KC_4", "KC_5", "KC_6", "KC_7", "KC_8", "KC_9", "KC_0"],
    ["LCTL_T(KC_N)", "KC_R", "KC_T", "LSFT_T(KC_S)", "KC_G",
     "KC_Y", "RSFT_T(KC_H)", "KC_A", "KC_E", "KC_I"],
    ["KC_LCTL", "MO(1)", "KC_M", "KC_C", "KC_V", "KC_K", "KC_P", "KC_DOT", "KC_SPC", "KC_QUOT"],
]

[[layer]]
keys = [
    ["_______", "_______", "_______", "_______", "_______", "_______", "_______", "_______", "_______", "_______"],
    ["_______", "_______", "_______", "_______", "_______", "_______", "_______", "_______", "_______", "KC_SCLN"],
    ["_______", "_______", "_______", "_______", "_______", "_______", "_______", "_______", "_______", "_______"],
]
"#;

    const TWO: KeyPos = KeyPos::new(0, 1);
    const N: KeyPos = KeyPos::new(1, 0);
    const R: KeyPos = KeyPos::new(1, 1);
    const T: KeyPos = KeyPos::new(1, 2);
    const S: KeyPos = KeyPos::new(1, 3);
    const H: KeyPos = KeyPos::new(1, 6);
    const I: KeyPos = KeyPos::new(1, 9);
    const CTRL: KeyPos = KeyPos::new(2, 0);
    const MO1: KeyPos = KeyPos::new(2, 1);

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    /// Simulator for BOARD, with extra TOML placed ahead of it
    fn simulator_with(extra: &str) -> Simulator {
        init_logging();
        let config = KeyboardConfig::from_toml(&format!("{}\n{}", extra, BOARD)).unwrap();
        Simulator::from_config(config)
    }

    fn simulator() -> Simulator {
        simulator_with("")
    }

    /// Press and release a key `hold` ms apart
    fn tap(sim: &mut Simulator, key: KeyPos, time: u16, hold: u16) {
        sim.press(key, time);
        sim.release(key, time + hold);
    }

    // =========================================================================
    // Opposite-hand shifts
    // =========================================================================

    #[test]
    fn test_quick_roll_stays_lowercase() {
        let mut sim = simulator();
        sim.press(S, 0);
        sim.press(I, 40);
        sim.release(S, 70);
        sim.release(I, 90);

        assert_eq!(sim.output(), "si");
        assert_eq!(sim.engine().registry().active_count(), 0);
    }

    #[test]
    fn test_opposite_hand_shift_after_lightshift_term() {
        // held 180ms: past the 150ms lightshift term, short of the usual 200ms
        let mut sim = simulator();
        sim.press(S, 0);
        sim.press(I, 100);
        assert_eq!(sim.state_of(S), ShiftState::LightshiftTt);

        sim.release(I, 180);
        assert_eq!(sim.state_of(S), ShiftState::DoubleShifting);
        sim.release(S, 200);

        assert_eq!(sim.output(), "I");
        assert!(!sim.engine().registry().is_tracked(S));
        assert_eq!(sim.mods(), Mods::empty());
    }

    #[test]
    fn test_plain_tap_is_inactive_at_release() {
        let mut sim = simulator();
        tap(&mut sim, S, 0, 50);

        assert_eq!(sim.output(), "s");
        let last = sim.reports().last().unwrap();
        assert!(last.shifts.is_empty());
    }

    // =========================================================================
    // Same-hand shifts
    // =========================================================================

    #[test]
    fn test_same_hand_roll_uses_extended_term() {
        let mut sim = simulator();
        sim.press(S, 0);
        sim.press(T, 50);
        assert_eq!(sim.state_of(S), ShiftState::ExtendedTt);
        sim.press(R, 100);
        sim.release(S, 300);
        sim.release(T, 310);
        sim.release(R, 320);

        assert_eq!(sim.output(), "str");
    }

    #[test]
    fn test_released_extended_lasts_one_event() {
        let mut sim = simulator();
        sim.press(S, 0);
        sim.press(T, 50);
        sim.release(S, 300);

        // the arbiter still saw the extended term when deciding the tap
        assert_eq!(sim.state_of(S), ShiftState::ReleasedExtended);
        let shift = mod_tap(MOD_LSFT, KC_S);
        assert_eq!(sim.engine().term_for(shift, &KeyRecord::release(S, 300)), u16::MAX);

        sim.release(T, 310);
        assert_eq!(sim.state_of(S), ShiftState::Inactive);
        assert_eq!(sim.output(), "st");
    }

    #[test]
    fn test_short_custom_extended_term_can_expire() {
        let mut sim = simulator_with("[terms]\nextended = 200\n");
        sim.press(S, 0);
        sim.press(T, 50);
        sim.press(R, 100);
        sim.release(S, 300);
        sim.release(T, 310);
        sim.release(R, 320);

        // held past the short term, shift applies once and is then dropped
        assert_eq!(sim.output(), "Tr");
    }

    // =========================================================================
    // Dropshift
    // =========================================================================

    #[test]
    fn test_dropshift_stops_double_capital() {
        let mut sim = simulator();
        sim.press(S, 0);
        sim.press(I, 100);
        sim.press(T, 170);
        assert!(!sim.engine().registry().is_tracked(S));
        assert!(!sim.mods().has_shift());

        sim.release(I, 180);
        sim.release(T, 200);
        sim.release(S, 230);

        assert_eq!(sim.output(), "It");
    }

    #[test]
    fn test_dropshift_disabled_keeps_double_capital() {
        let mut sim = simulator_with("dropshift = false\n");
        sim.press(S, 0);
        sim.press(I, 100);
        sim.press(T, 170);
        sim.release(I, 180);
        sim.release(T, 200);
        sim.release(S, 230);

        assert_eq!(sim.output(), "IT");
        assert_eq!(sim.engine().registry().active_count(), 0);
    }

    #[test]
    fn test_symbols_do_not_consume_single() {
        let mut sim = simulator();
        sim.press(S, 0);
        tap(&mut sim, TWO, 200, 10);
        assert_eq!(sim.state_of(S), ShiftState::SingleShifting);

        tap(&mut sim, I, 220, 10);
        assert_eq!(sim.state_of(S), ShiftState::DoubleShifting);
        tap(&mut sim, T, 240, 10);
        sim.release(S, 260);

        assert_eq!(sim.output(), "@It");
    }

    #[test]
    fn test_shortcut_keeps_shift() {
        let mut sim = simulator();
        sim.press(CTRL, 0);
        sim.press(S, 10);
        tap(&mut sim, I, 200, 10);
        tap(&mut sim, T, 220, 10);

        assert_eq!(sim.state_of(S), ShiftState::DoubleShifting);
        assert!(sim.mods().contains(Mods::LCTRL | Mods::LSHIFT));
        assert_eq!(sim.output(), "IT");
    }

    // =========================================================================
    // Layers, modifiers and arbiter hooks
    // =========================================================================

    #[test]
    fn test_layer_key_leaves_shift_unresolved() {
        let mut sim = simulator();
        sim.press(S, 0);
        sim.press(MO1, 30);
        assert_eq!(sim.state_of(S), ShiftState::Unresolved);

        sim.press(CTRL, 40);
        assert_eq!(sim.state_of(S), ShiftState::Unresolved);

        sim.press(I, 60);
        assert_eq!(sim.state_of(S), ShiftState::LightshiftTt);
    }

    #[test]
    fn test_permissive_hold_skips_shift_keys() {
        let mut sim = simulator_with("").with_permissive_hold(true);
        sim.press(S, 0);
        tap(&mut sim, I, 30, 30);
        sim.release(S, 90);
        assert_eq!(sim.output(), "si");

        // other mod-taps still resolve as holds on a nested tap
        let mut sim = simulator_with("").with_permissive_hold(true);
        sim.press(N, 0);
        tap(&mut sim, I, 30, 30);
        sim.release(N, 90);
        assert_eq!(sim.output(), "i");
    }

    #[test]
    fn test_right_hand_shift() {
        let mut sim = simulator();
        sim.press(H, 0);
        tap(&mut sim, S, 170, 20);
        sim.release(H, 220);
        assert_eq!(sim.output(), "S");
    }

    #[test]
    fn test_trace_across_clock_wrap() {
        let trace = parse_trace(
            "# shift held over the 16-bit rollover\n\
             65500 down 1,3\n\
             65600 down 1,9\n\
             65700 up 1,9\n\
             65720 up 1,3\n",
        )
        .unwrap();

        let mut sim = simulator();
        sim.run_trace(&trace);
        assert_eq!(sim.output(), "I");
        assert_eq!(sim.reports().len(), 4);
    }

    #[test]
    fn test_handedness_table_overrides_geometry() {
        let handedness = r#"
[handedness]
layout = [
    "LLLLLRRRRR",
    "LLLLLRRRRL",
    "LLLLLRRRRR",
]
"#;
        let mut sim = simulator_with(handedness);
        sim.press(S, 0);
        sim.press(I, 40);
        assert_eq!(sim.engine().handedness(I), Hand::Left);
        assert_eq!(sim.state_of(S), ShiftState::ExtendedTt);
    }

    // =========================================================================
    // Engine properties
    // =========================================================================

    struct ThreeShifts {
        mods: Mods,
    }

    impl KeymapLookup for ThreeShifts {
        fn keycode_at(&self, key: KeyPos) -> Keycode {
            match key {
                R => mod_tap(MOD_LSFT, KC_R),
                S => mod_tap(MOD_LSFT, KC_S),
                H => mod_tap(MOD_RSFT, KC_I),
                I => KC_I,
                T => KC_T,
                _ => KC_NO,
            }
        }
    }

    impl Host for ThreeShifts {
        fn mods(&self) -> Mods {
            self.mods
        }

        fn unregister_mods(&mut self, mods: Mods) {
            self.mods.remove(mods);
        }
    }

    fn early(engine: &mut Lightshift, host: &ThreeShifts, key: KeyPos, record: KeyRecord) {
        engine.on_early_event(host.keycode_at(key), &record, host);
    }

    #[test]
    fn test_registry_capacity() {
        let mut engine = Lightshift::new(LightshiftConfig::default());
        let host = ThreeShifts { mods: Mods::empty() };

        early(&mut engine, &host, S, KeyRecord::press(S, 0));
        early(&mut engine, &host, R, KeyRecord::press(R, 10));
        early(&mut engine, &host, H, KeyRecord::press(H, 20));

        let registry = engine.registry();
        assert_eq!(registry.active_count(), 2);
        assert_eq!(registry.state_of(S), ShiftState::ExtendedTt);
        assert_eq!(registry.state_of(R), ShiftState::LightshiftTt);
        assert!(!registry.is_tracked(H));

        // untracked shift keys still get the lightshift term
        let press = KeyRecord::press(H, 20);
        assert_eq!(engine.term_for(host.keycode_at(H), &press), 150);
    }

    #[test]
    fn test_term_is_idempotent() {
        let mut engine = Lightshift::new(LightshiftConfig::default());
        let host = ThreeShifts { mods: Mods::empty() };
        let shift = host.keycode_at(S);
        let press = KeyRecord::press(S, 0);

        early(&mut engine, &host, S, press);
        early(&mut engine, &host, T, KeyRecord::press(T, 30));
        let terms: Vec<u16> = (0..5).map(|_| engine.term_for(shift, &press)).collect();
        assert!(terms.iter().all(|term| *term == u16::MAX));
        assert_eq!(engine.registry().state_of(S), ShiftState::ExtendedTt);
    }

    #[test]
    fn test_handedness_is_deterministic() {
        let engine = Lightshift::new(LightshiftConfig::default());
        for row in 0..3 {
            for col in 0..10 {
                let key = KeyPos::new(row, col);
                let first = engine.handedness(key);
                assert_eq!(engine.handedness(key), first);
                assert_eq!(first, if col < 5 { Hand::Left } else { Hand::Right });
            }
        }
    }

    #[test]
    fn test_double_only_after_single() {
        let mut engine = Lightshift::new(LightshiftConfig::default());
        let mut host = ThreeShifts { mods: Mods::empty() };

        early(&mut engine, &host, S, KeyRecord::press(S, 0));
        early(&mut engine, &host, I, KeyRecord::press(I, 40));
        // a letter arrives before the shift is held: nothing to consume
        engine.on_late_event(KC_I, &KeyRecord::press(I, 40), &mut host);
        assert_eq!(engine.registry().state_of(S), ShiftState::LightshiftTt);

        // a tapped shift never becomes SINGLE
        let shift = host.keycode_at(S);
        engine.on_late_event(shift, &KeyRecord::press(S, 0).with_tap_count(1), &mut host);
        assert_eq!(engine.registry().state_of(S), ShiftState::LightshiftTt);

        engine.on_late_event(shift, &KeyRecord::press(S, 0), &mut host);
        assert_eq!(engine.registry().state_of(S), ShiftState::SingleShifting);
        engine.on_late_event(KC_I, &KeyRecord::press(I, 160), &mut host);
        assert_eq!(engine.registry().state_of(S), ShiftState::DoubleShifting);
    }

    #[test]
    fn test_drop_clears_only_the_shift_mods() {
        let mut engine = Lightshift::new(LightshiftConfig::default());
        let mut host = ThreeShifts {
            mods: Mods::LSHIFT | Mods::RSHIFT,
        };
        let shift = host.keycode_at(S);

        early(&mut engine, &host, S, KeyRecord::press(S, 0));
        engine.on_late_event(shift, &KeyRecord::press(S, 0), &mut host);
        engine.on_late_event(KC_I, &KeyRecord::press(I, 160), &mut host);
        engine.on_late_event(KC_T, &KeyRecord::press(T, 180), &mut host);

        assert!(!engine.registry().is_tracked(S));
        assert_eq!(host.mods, Mods::RSHIFT);
    }
}
