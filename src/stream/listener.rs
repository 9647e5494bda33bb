use anyhow::{bail, Result};
use evdev::{AbsoluteAxisCode, Device, EventSummary, InputEvent, KeyCode, SynchronizationCode};
use log::{error, info};
use nix::sys::epoll::{Epoll, EpollCreateFlags, EpollEvent, EpollFlags, EpollTimeout};
use std::{
    os::{
        fd::RawFd,
        unix::io::{AsFd, AsRawFd},
    },
    time::{Duration, UNIX_EPOCH},
};

use super::capture::{PointerEvent, PointerId, PointerPhase, PointerSample};
use crate::layout::Rect;

const IDLE_TICK_MS: u16 = 50;
const TOUCH_POINTER: PointerId = PointerId(0);

/// What the listener hands to its callback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Signal {
    Pointer(PointerEvent),
    /// No input for a tick; lets the caller run timers.
    Idle,
}

/// Raw single-touch input, already reduced from evdev codes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawInput {
    X(i32),
    Y(i32),
    Contact(bool),
    Report(Duration),
}

/// Turns frames of absolute-axis input into pointer events in surface coordinates.
#[derive(Debug, Clone)]
pub struct TouchAssembler {
    surface: Rect,
    x: i32,
    y: i32,
    contact: bool,
    reported_contact: bool,
    moved: bool,
    left: bool,
}

impl TouchAssembler {
    /// `surface` is the keyboard's area in device units.
    pub fn new(surface: Rect) -> Self {
        Self {
            surface,
            x: 0,
            y: 0,
            contact: false,
            reported_contact: false,
            moved: false,
            left: false,
        }
    }

    pub fn feed(&mut self, input: RawInput) -> Option<PointerEvent> {
        match input {
            RawInput::X(x) => {
                self.moved |= x != self.x;
                self.x = x;
                None
            }
            RawInput::Y(y) => {
                self.moved |= y != self.y;
                self.y = y;
                None
            }
            RawInput::Contact(contact) => {
                self.contact = contact;
                None
            }
            RawInput::Report(t) => self.report(t),
        }
    }

    fn report(&mut self, t: Duration) -> Option<PointerEvent> {
        let sample = PointerSample::new(
            self.x as f32 - self.surface.x,
            self.y as f32 - self.surface.y,
            t,
        );
        let inside = sample.x >= 0.0
            && sample.y >= 0.0
            && sample.x < self.surface.width
            && sample.y < self.surface.height;

        let phase = match (self.reported_contact, self.contact) {
            (false, true) => {
                self.left = false;
                Some(PointerPhase::Down)
            }
            (true, false) => Some(PointerPhase::Up),
            (true, true) if self.left => None,
            (true, true) if !inside => {
                self.left = true;
                Some(PointerPhase::Leave)
            }
            (true, true) if self.moved => Some(PointerPhase::Move),
            _ => None,
        };

        self.reported_contact = self.contact;
        self.moved = false;
        phase.map(|phase| PointerEvent::new(TOUCH_POINTER, phase, sample))
    }
}

pub struct PointerListener {
    devices: Vec<Device>,
    assembler: TouchAssembler,
}

impl PointerListener {
    pub fn new(surface: Rect) -> Result<Self> {
        let devices = Self::find_touch_devices()?;
        if devices.is_empty() {
            bail!("No touch or tablet devices found");
        }

        Ok(Self {
            devices,
            assembler: TouchAssembler::new(surface),
        })
    }

    fn find_touch_devices() -> Result<Vec<Device>> {
        let mut found = Vec::new();

        for (path, device) in evdev::enumerate() {
            if Self::is_touch_device(&device) {
                info!(
                    "Using pointer device: {} ({})",
                    device.name().unwrap_or("Unknown"),
                    path.display()
                );
                found.push(device);
            }
        }

        Ok(found)
    }

    fn is_touch_device(device: &Device) -> bool {
        device.supported_events().contains(evdev::EventType::ABSOLUTE)
            && device.supported_absolute_axes().is_some_and(|axes| {
                axes.contains(AbsoluteAxisCode::ABS_X) && axes.contains(AbsoluteAxisCode::ABS_Y)
            })
            && device.supported_keys().is_some_and(|keys| {
                keys.contains(KeyCode::BTN_TOUCH) || keys.contains(KeyCode::BTN_LEFT)
            })
    }

    fn translate(event: &InputEvent) -> Option<RawInput> {
        match event.destructure() {
            EventSummary::AbsoluteAxis(_, AbsoluteAxisCode::ABS_X, value) => Some(RawInput::X(value)),
            EventSummary::AbsoluteAxis(_, AbsoluteAxisCode::ABS_Y, value) => Some(RawInput::Y(value)),
            EventSummary::Key(_, KeyCode::BTN_TOUCH | KeyCode::BTN_LEFT, value) => {
                Some(RawInput::Contact(value != 0))
            }
            EventSummary::Synchronization(_, SynchronizationCode::SYN_REPORT, _) => {
                let t = event
                    .timestamp()
                    .duration_since(UNIX_EPOCH)
                    .unwrap_or_default();
                Some(RawInput::Report(t))
            }
            _ => None,
        }
    }

    pub fn listen<F>(&mut self, mut callback: F) -> Result<()>
    where
        F: FnMut(Signal),
    {
        let epoll = Epoll::new(EpollCreateFlags::empty())?;

        // Store raw file descriptors alongside devices
        let device_fds: Vec<(RawFd, &mut Device)> = self
            .devices
            .iter_mut()
            .map(|d| (d.as_raw_fd(), d))
            .collect();

        for (fd, dev) in &device_fds {
            dev.set_nonblocking(true)?;
            epoll.add(
                dev.as_fd(),
                EpollEvent::new(EpollFlags::EPOLLIN, *fd as u64),
            )?;
        }

        let mut events = vec![EpollEvent::empty(); device_fds.len()];

        loop {
            let num_events = epoll.wait(&mut events, EpollTimeout::from(IDLE_TICK_MS))?;
            if num_events == 0 {
                callback(Signal::Idle);
                continue;
            }

            for event in events.iter().take(num_events) {
                let fd = event.data() as RawFd;

                let inputs: Vec<InputEvent> = {
                    // Short-lived device borrow
                    let device = match self.devices.iter_mut().find(|d| d.as_raw_fd() == fd) {
                        Some(d) => d,
                        None => continue,
                    };

                    match device.fetch_events() {
                        Ok(events_iter) => events_iter.collect(),
                        Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => vec![],
                        Err(e) => {
                            error!("Error reading events: {}", e);
                            vec![]
                        }
                    }
                };

                for input in inputs.iter().filter_map(Self::translate) {
                    if let Some(pointer) = self.assembler.feed(input) {
                        callback(Signal::Pointer(pointer));
                    }
                }
            }
        }
    }
}
