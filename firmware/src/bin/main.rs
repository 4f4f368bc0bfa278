#![no_std]
#![no_main]

use defmt::{error, info, warn};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::clocks::clk_sys_freq;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::peripherals::UART1;
use embassy_rp::pwm::Pwm;
use embassy_rp::uart::{Config as UartConfig, Uart};
use embassy_time::Instant;
use gyro_servo::{
    servo_pwm_config, FrameReader, FrameWriter, Outbound, OutboundChannel, PwmServoOutput,
    QueueSink, ServoEngine, DEFAULT_CONFIG, MAX_OUTBOUND_LEN, UART_BAUD_RATE,
};
use servo_core::servo_proto::GREETING;
use static_cell::StaticCell;

#[cfg(feature = "dev-panic")]
use panic_probe as _;
#[cfg(feature = "prod-panic")]
use panic_reset as _;

bind_interrupts!(struct Irqs {
    UART1_IRQ => embassy_rp::uart::InterruptHandler<UART1>;
});

/// Queue of snapshots and acknowledgements waiting for the UART writer.
static OUTBOUND: StaticCell<OutboundChannel> = StaticCell::new();

type Engine = ServoEngine<PwmServoOutput<'static>, QueueSink>;

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("gyro-servo starting...");

    let p = embassy_rp::init(embassy_rp::config::Config::default());

    let outbound = OUTBOUND.init(OutboundChannel::new());

    // --- UART Setup ---
    let mut uart_config = UartConfig::default();
    uart_config.baudrate = UART_BAUD_RATE;

    let uart = Uart::new(
        p.UART1,
        p.PIN_8, // TX
        p.PIN_9, // RX
        Irqs,
        p.DMA_CH0,
        p.DMA_CH1,
        uart_config,
    );
    let (tx, rx) = uart.split();

    // --- PWM Setup ---
    let pwm_config = servo_pwm_config(clk_sys_freq(), &DEFAULT_CONFIG.timing);
    let (pitch, roll) =
        Pwm::new_output_ab(p.PWM_SLICE6, p.PIN_12, p.PIN_13, pwm_config.clone()).split();
    let (yaw, _) = Pwm::new_output_a(p.PWM_SLICE7, p.PIN_14, pwm_config).split();
    let (Some(pitch), Some(roll), Some(yaw)) = (pitch, roll, yaw) else {
        error!("PWM outputs unavailable");
        return;
    };
    let servos = PwmServoOutput::new(pitch, roll, yaw, &DEFAULT_CONFIG.timing);

    let mut engine = ServoEngine::new(DEFAULT_CONFIG, servos, QueueSink::new(outbound));
    // Center the servos before the first frame arrives
    engine.servo_reset();

    // Error indicator (on-board LED on Pico)
    let led = Output::new(p.PIN_25, Level::Low);

    spawner.spawn(engine_task(engine, FrameReader::new(rx), led).unwrap());
    spawner.spawn(writer_task(FrameWriter::new(tx), outbound).unwrap());

    info!("gyro-servo initialized, waiting for frames...");
}

/// Engine task - reads frames from the bridge and applies them in order.
#[embassy_executor::task]
async fn engine_task(
    mut engine: Engine,
    mut reader: FrameReader<'static>,
    mut led: Output<'static>,
) {
    loop {
        match reader.read_frame().await {
            Ok(frame) => {
                let now_ms = Instant::now().as_millis();
                if let Some(ack) = engine.handle_message(frame, now_ms) {
                    if let Err(e) = engine.sink_mut().ack(ack) {
                        warn!("Ack dropped: {}", e);
                    }
                }
            }
            Err(e) => {
                error!("Link error: {:?}", e);
                led.toggle();
            }
        }
    }
}

/// Writer task - drains the outbound queue onto the UART.
#[embassy_executor::task]
async fn writer_task(mut writer: FrameWriter<'static>, outbound: &'static OutboundChannel) {
    if let Err(e) = writer.write_frame(GREETING.as_bytes()).await {
        error!("Greeting failed: {:?}", e);
    }

    let mut buf = [0u8; MAX_OUTBOUND_LEN];
    loop {
        let message: Outbound = outbound.receive().await;
        let len = match message.render(&mut buf) {
            Ok(len) => len,
            Err(e) => {
                warn!("Render failed: {}", e);
                continue;
            }
        };
        if let Err(e) = writer.write_frame(&buf[..len]).await {
            error!("Write error: {:?}", e);
        }
    }
}
