use ftdi_bitbang_serial::{self, Result};

fn main() -> Result<()> {
    env_logger::init();
    let ports: Vec<String> = std::env::args().skip(1).collect();
    if ports.is_empty() {
        eprintln!("usage: locate_port <tty> [<tty>...]");
        return Ok(());
    }

    for port in &ports {
        match ftdi_bitbang_serial::locate(port) {
            Ok(location) => println!(
                "{}: bus {} dev {} interface {}",
                port, location.bus, location.device, location.interface
            ),
            Err(e) => println!("{}: {}", port, e),
        }
    }
    Ok(())
}
