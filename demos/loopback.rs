// Needs TXD wired to RXD on the adapter.
use ftdi_bitbang_serial::{FtdiSerial, Result, SerialConfig};
use std::time::Duration;

fn main() -> Result<()> {
    env_logger::init();
    let port_name = std::env::args().nth(1).unwrap_or_else(|| "/dev/ttyUSB0".to_string());
    let config = SerialConfig::default().timeout(Duration::from_millis(500));
    let mut port = FtdiSerial::open_with_config(&port_name, config)?;

    for baud in [9600, 115_200, 921_600] {
        port.set_baud_rate(baud)?;
        port.flush_input()?;

        let message = format!("loopback at {} baud", baud);
        let written = port.write(message.as_bytes())?;
        let echoed = port.read(written)?;
        if echoed == message.as_bytes() {
            println!("{}: ok", baud);
        } else {
            println!("{}: got {:02X?}", baud, echoed);
        }
    }
    Ok(())
}
