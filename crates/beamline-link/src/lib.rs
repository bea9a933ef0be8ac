// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Beamline Link — TCP transport with bounded connect retries, the LPD
// job-submission handshake state machine, and the PJL/PCL/HPGL frame
// serializer.  This crate bridges between the domain types defined in
// `beamline-core` and the device on the other end of the socket.

pub mod handshake;
pub mod job;
pub mod transport;
pub mod wire;

pub use handshake::Handshake;
pub use transport::{Connection, DnsResolver, Resolver};
