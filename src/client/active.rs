//! Steady-state ticking: ingest, dispatch, idle probing and maintenance.

use std::time::{Duration, Instant};

use tracing::{debug, warn};

use super::{Connection, Phase, PlayerTunables};
use crate::{
    codec::{ProtocolCodec, writer},
    dispatch::opcode,
    download,
    error::{DisconnectReason, ProtocolViolation},
    extension::FeatureSet,
    hooks::ClientEvents,
    metrics::{self, Direction, ErrorKind},
    transport::Transport,
};

/// Bytes a legacy D3 server may leave behind a `HackControl` packet.
const D3_STRAY_BYTES: [u8; 2] = [0x00, 0xFF];

impl<C: ProtocolCodec, E: ClientEvents, T: Transport> Connection<C, E, T> {
    pub(super) fn tick_active(&mut self, interval: Duration) {
        let now = self.clock.now();
        self.check_idle(now, interval);
        if self.phase != Phase::Active {
            return;
        }

        let Some(transport) = self.transport.as_mut() else {
            return;
        };
        let eof = match self.recv.fill_from(transport) {
            Ok(ingest) => ingest.eof,
            Err(e) => {
                warn!(error = %e, "error reading packets");
                metrics::inc_errors(ErrorKind::Transport);
                self.disconnect(DisconnectReason::read_failed());
                return;
            }
        };

        if let Err(violation) = self.dispatch_buffered(now) {
            self.protocol_violation(&violation);
            return;
        }
        if let Some(reason) = self.engine.state.pending_disconnect.take() {
            self.disconnect(reason);
            return;
        }
        self.recv.compact();
        if eof {
            metrics::inc_errors(ErrorKind::Transport);
            self.disconnect(DisconnectReason::closed_by_server());
            return;
        }

        let ratio = u64::from(self.engine.config.maintenance_ratio.max(1));
        if self.net_ticks % ratio == 0 {
            self.maintenance(now);
            if self.phase != Phase::Active {
                return;
            }
        }
        self.net_ticks += 1;
        if !self.engine.send.is_empty() {
            self.flush();
        }
    }

    /// Probe the socket once per probe interval after a silent idle window.
    fn check_idle(&mut self, now: Instant, interval: Duration) {
        if now.saturating_duration_since(self.last_packet) < self.engine.config.idle_timeout {
            return;
        }
        self.idle_accumulator += interval;
        if self.idle_accumulator < self.engine.config.probe_interval {
            return;
        }
        self.idle_accumulator = Duration::ZERO;
        let alive = !self.write_failed && self.transport.as_mut().is_some_and(Transport::probe_alive);
        if !alive {
            debug!(write_failed = self.write_failed, "liveness probe failed");
            metrics::inc_errors(ErrorKind::Transport);
            self.disconnect(DisconnectReason::lost_connection());
        }
    }

    /// Dispatch every complete packet in the receive buffer.
    ///
    /// Stops early at a partial packet or when a handler requests a
    /// disconnect.
    pub(super) fn dispatch_buffered(&mut self, now: Instant) -> Result<(), ProtocolViolation> {
        while let Some(op) = self.recv.peek() {
            let position = self.recv.cursor();
            let state = &mut self.engine.state;
            if state.needs_d3_fix
                && state.last_opcode == Some(opcode::HACK_CONTROL)
                && D3_STRAY_BYTES.contains(&op)
            {
                debug!(byte = op, position, "skipping stray HackControl byte from D3 server");
                self.recv.consume(1);
                state.last_opcode = None;
                state.tunables = PlayerTunables::default();
                continue;
            }

            let Some(slot) = self.engine.table.lookup(op) else {
                return Err(ProtocolViolation::InvalidOpcode {
                    opcode: op,
                    position,
                    highest: self.engine.table.highest(),
                });
            };
            let Some(handler) = slot.handler() else {
                return Err(ProtocolViolation::UnhandledOpcode {
                    opcode: op,
                    position,
                });
            };
            let frame_len = slot.frame_len();
            if self.recv.remaining() < frame_len {
                break;
            }

            self.engine.state.last_opcode = Some(op);
            self.last_packet = now;
            self.idle_accumulator = Duration::ZERO;
            let payload = &self.recv.unread()[1..frame_len];
            let mut session = self.engine.session(Some(op), now, &mut self.events);
            let result = handler(&mut session, payload);
            self.recv.consume(frame_len);
            metrics::inc_packets(Direction::Inbound, 1);
            result.map_err(|source| ProtocolViolation::Malformed {
                opcode: op,
                position,
                source,
            })?;
            if self.engine.state.pending_disconnect.is_some() {
                break;
            }
        }
        Ok(())
    }

    fn maintenance(&mut self, now: Instant) {
        for key in [download::TERRAIN, download::TEXTURE_PACK] {
            let Some(outcome) = self.engine.downloads.try_take(key) else {
                continue;
            };
            if let Some(status) = outcome.reportable_status() {
                let message = format!("{status} error when trying to download texture pack");
                warn!(status, key, "texture pack download failed");
                self.events.warning(&message);
            }
            let mut session = self.engine.session(None, now, &mut self.events);
            C::on_resource(&mut session, key, outcome);
        }

        let mut session = self.engine.session(None, now, &mut self.events);
        C::tick(&mut session);

        let interval = u64::from(self.engine.config.ping_interval);
        if interval > 0
            && self.maintenance_cycles % interval == 0
            && self.engine.registry.features().contains(FeatureSet::TWO_WAY_PING)
        {
            let data = self.engine.state.pings.next_data(now);
            writer::two_way_ping(&mut self.engine.send, false, data);
        }
        self.maintenance_cycles += 1;

        self.flush();
        if let Some(reason) = self.engine.state.pending_disconnect.take() {
            self.disconnect(reason);
        }
    }
}
