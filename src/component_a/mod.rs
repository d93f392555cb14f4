
// Component A: Telemetry ingestion
// owns the UDP endpoint, samples it once per frame (latest value wins)
// and decodes the rig's CSV payload. The rig emulator lives here too,
// it produces the same wire format for the demo host and benches.

pub mod socket_channel;
pub mod frame_drain;
pub mod parser;
pub mod sensor;
