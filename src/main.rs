#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use {esp_backtrace as _, esp_println as _};

use dac_cosine::{tasks::dac_sync_task, Board, TUNABLES};

#[esp_hal_embassy::main]
async fn main(spawner: Spawner) {
    info!("Starting dac-cosine");
    let board = Board::init();
    info!("Initial tunables: {}", TUNABLES.snapshot());

    spawner.spawn(dac_sync_task(board.dac)).unwrap();
    info!("DAC sync task spawned");
}
