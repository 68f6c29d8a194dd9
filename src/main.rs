use qrcheckin::app::startup::startup;
use qrcheckin::core::error_handling::log_error_with_context;
use qrcheckin::core::logging;
use std::time::Duration;

fn main() {
    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: failed to start async runtime: {e}");
            std::process::exit(1);
        }
    };

    let result = runtime.block_on(startup());
    // stdin is read on a blocking thread that never returns on its own
    runtime.shutdown_timeout(Duration::from_millis(250));

    if let Err(error) = result {
        if logging::is_initialized() {
            log_error_with_context(&error, "qrcheckin failed");
        } else {
            eprintln!("Error: {error}");
        }
        std::process::exit(1);
    }
}
