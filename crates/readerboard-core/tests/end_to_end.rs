//! Cross-module behavior through the public device API.

use readerboard_core::device::SilentAnnunciator;
use readerboard_core::{Device, HardwareSpec, NullStore};

fn device() -> Device {
    Device::new(
        HardwareSpec::rgb_64x8(),
        Box::new(NullStore),
        Box::new(SilentAnnunciator),
    )
}

fn usb(dev: &mut Device, bytes: &[u8]) -> Vec<u8> {
    let mut reply = Vec::new();
    dev.feed_usb(bytes, &mut reply);
    reply
}

fn settle(dev: &mut Device) {
    for _ in 0..256 {
        dev.tick();
    }
}

#[test]
fn addressed_bus_frame_executes_and_replies() {
    let mut dev = device();
    usb(&mut dev, b"=75C?");
    usb(&mut dev, b"T...Hello\x1b");
    settle(&mut dev);
    assert!(!dev.display().is_blank());

    // Direct RS-485 frame to unit 7: clear and query.
    let mut reply = Vec::new();
    dev.feed_bus(&[0xD7, b'C', b'?'], &mut reply);
    assert!(dev.display().is_blank());
    assert_eq!(reply, b"L0$FS_$SS_$\n");
}

#[test]
fn frames_for_other_units_are_ignored() {
    let mut dev = device();
    usb(&mut dev, b"=75C?");
    usb(&mut dev, b"T...Hello\x1b");
    settle(&mut dev);

    let mut reply = Vec::new();
    dev.feed_bus(&[0xD2, b'C', b'?'], &mut reply);
    assert!(!dev.display().is_blank());
    assert!(reply.is_empty());
}

#[test]
fn broadcast_mutates_state_but_never_replies() {
    let mut dev = device();
    usb(&mut dev, b"=75C?");
    usb(&mut dev, b"T...Hello\x1b");
    settle(&mut dev);

    // Global frame for group 15, all units: clear, then query.
    let mut reply = Vec::new();
    dev.feed_bus(&[0xFF, 0x00, b'C', b'Q'], &mut reply);
    assert!(dev.display().is_blank());
    assert!(reply.is_empty());
}

#[test]
fn global_frame_with_target_list() {
    let mut dev = device();
    usb(&mut dev, b"=75C?");

    // Listed: executes (still no reply on a global frame).
    let mut reply = Vec::new();
    dev.feed_bus(&[0xFF, 0x02, 0x03, 0x07, b'S', b'4', b'?'], &mut reply);
    assert_eq!(dev.leds().lit_codes(), b"4");
    assert!(reply.is_empty());

    // Not listed: state untouched.
    dev.feed_bus(&[0xFF, 0x01, 0x03, b'X'], &mut reply);
    assert_eq!(dev.leds().lit_codes(), b"4");
}

#[test]
fn unconfigured_unit_never_hears_the_bus() {
    let mut dev = device();
    usb(&mut dev, b"T...Hello\x1b");
    settle(&mut dev);

    let mut reply = Vec::new();
    dev.feed_bus(&[0xD0, b'C', b'?'], &mut reply);
    assert!(!dev.display().is_blank());
    assert!(reply.is_empty());
}

#[test]
fn scroll_left_transition_fully_replaces_display() {
    let mut dev = device();
    usb(&mut dev, b"T...OLD\x1b");
    settle(&mut dev);
    let old = dev.display().clone();

    usb(&mut dev, b"T..<NEW\x1b");
    // The transition runs on ticks; nothing changes until it does.
    assert_eq!(*dev.display(), old);
    dev.tick();
    assert_ne!(*dev.display(), old);
    settle(&mut dev);

    // The settled display matches a plain draw of the same text.
    let mut reference = device();
    usb(&mut reference, b"T...NEW\x1b");
    settle(&mut reference);
    assert_eq!(dev.display(), reference.display());
}

#[test]
fn configure_round_trips_through_query() {
    let mut dev = device();
    usb(&mut dev, b"=05C3");
    assert_eq!(dev.config().unit_address, Some(0));
    assert_eq!(dev.config().rs485_speed.rate(), 115200);
    assert_eq!(dev.config().global_address, 3);

    let reply = usb(&mut dev, b"Q");
    let text = String::from_utf8(reply).unwrap();
    assert!(text.starts_with("Q0C=05C3I_$"));
}

#[test]
fn bad_speed_code_leaves_settings_unchanged() {
    let mut dev = device();
    usb(&mut dev, b"=75C?");
    usb(&mut dev, b"=3ZZ0");
    assert_eq!(dev.config().unit_address, Some(7));
    assert_eq!(dev.config().usb_speed.rate(), 9600);
    assert_eq!(dev.config().rs485_speed.rate(), 115200);
}

#[test]
fn abort_byte_resynchronizes_mid_command() {
    let mut dev = device();
    usb(&mut dev, b"T..<garbage");
    // Abort the half-read text command, then light an LED.
    usb(&mut dev, &[0x04]);
    usb(&mut dev, b"S2");
    assert_eq!(dev.leds().lit_codes(), b"2");
    settle(&mut dev);
    assert!(dev.display().is_blank());
}
