use log::*;

use std::convert::TryInto;
use std::thread;
use futures::executor;

use crossbeam_channel::{
  bounded, Sender, Receiver,
};

use actix_cors::Cors;
use actix_web::{get, web, middleware, HttpResponse, App, HttpServer};
use actix_web::rt::System;
use anyhow::anyhow;

use crate::{
  error::*,
  app::*,
  db::DbService,
  services::config_services,
};

#[derive(Debug)]
enum StopEvent {
  Shutdown,
  StopServer,
  StopServerFinished(u32),
}

#[get("/stop")]
async fn stop_server(waiter: web::Data<ServerWaiter>) -> HttpResponse {
  info!("Got shutdown request.");
  waiter.main_shutdown();

  HttpResponse::Ok().body("Shutting down.")
}

#[derive(Clone)]
struct ServerStopper {
  id: u32,
  tx: Sender<StopEvent>,
}

#[derive(Clone)]
struct ServerWaiter {
  id: u32,
  main_tx: Sender<StopEvent>,
  rx: Receiver<StopEvent>,
}

impl ServerStopper {
  pub fn new(id: u32, main_tx: Sender<StopEvent>) -> (Self, ServerWaiter) {
    let (tx, rx) = bounded(1);
    (Self{
      id,
      tx,
    }, ServerWaiter{
      id,
      main_tx,
      rx,
    })
  }

  pub fn shutdown(&self) {
    debug!("Signal server({}) to stop.", self.id);
    if let Err(err) = self.tx.send(StopEvent::StopServer) {
      error!("Server({}) stop signal failed: {:?}", self.id, err);
    }
  }
}

impl ServerWaiter {
  pub fn wait_shutdown(&self) -> Result<StopEvent> {
    debug!("Server waiting for shutdown signal.");
    Ok(self.rx.recv()?)
  }

  pub fn server_stopped(&self) {
    debug!("Server stopped, let main thread know.");
    if let Err(err) = self.main_tx.send(StopEvent::StopServerFinished(self.id)) {
      error!("Failed to notify main thread: {:?}", err);
    }
  }

  pub fn main_shutdown(&self) {
    info!("Signal main thread to shutdown.");
    if let Err(err) = self.main_tx.send(StopEvent::Shutdown) {
      error!("Failed to signal main thread: {:?}", err);
    }
  }
}

#[derive(Clone)]
struct MainStopper {
  tx: Sender<StopEvent>,
  rx: Receiver<StopEvent>,
  servers: Vec<ServerStopper>,
}

impl MainStopper {
  pub fn new() -> Self {
    let (tx, rx) = bounded(1);
    Self { tx, rx,
      servers: Vec::new(),
    }
  }

  pub fn new_server(&mut self) -> ServerWaiter {
    let id = self.servers.len();
    let (stopper, waiter) = ServerStopper::new(id as u32, self.tx.clone());
    self.servers.push(stopper);
    waiter
  }

  pub fn wait_shutdown(&self) {
    // wait on main stopper
    debug!("Wait for shutdown signal");
    let mut stopped_counter = 0usize;
    // wait for shutdown signal.
    while stopped_counter < self.servers.len() {
      match self.rx.recv() {
        Err(err) => {
          error!("Main thread waiter received error: {:?}", err);
          return;
        },
        Ok(StopEvent::Shutdown) => {
          info!("Got shutdown signal.  Stop servers.");
          break;
        },
        Ok(StopEvent::StopServerFinished(id)) => {
          let len = self.servers.len();
          stopped_counter += 1;
          if stopped_counter < len {
            let remain = len - stopped_counter;
            debug!("Server({}) stopped.  Remaining {}", id, remain);
          } else {
            debug!("Server({}) stopped.  All servers stopped.  Stop main thread", id);
            return;
          }
        },
        Ok(ev) => {
          error!("Main thread received invalid event: {:?}", ev);
        },
      }
    }

    // Tell the remaining servers to shutdown.
    let mut counter = self.servers.len() - stopped_counter;
    for stopper in self.servers.iter() {
      stopper.shutdown();
    }
    // Wait for all servers to shutdown.
    while counter > 0 {
      match self.rx.recv() {
        Err(err) => {
          error!("Main thread waiter received error during shutdown: {:?}", err);
          return;
        },
        Ok(StopEvent::StopServerFinished(id)) => {
          counter -= 1;
          debug!("Server({}) stopped.  Remaining {}", id, counter);
        },
        Ok(ev) => {
          debug!("Main thread ignoring event during shutdown: {:?}", ev);
        },
      }
    }
    info!("Stopped all servers.");
  }
}

pub fn execute(config: AppConfig) -> Result<()> {
  // Stopper for main thread.
  let mut main_stopper = MainStopper::new();

  // One store for every server and worker.
  let db = web::Data::new(DbService::from_config(&config)?);

  let servers = config.get_str_array("servers")?
    .ok_or_else(|| anyhow!("Missing list of servers"))?;
  for server in servers {
    let cfg = config.clone();
    let db = db.clone();
    let waiter = main_stopper.new_server();
    debug!("Spawn server: {}", server);
    thread::spawn(move || {
      if let Err(err) = run_server(&cfg, &server, db, waiter.clone()) {
        error!("Error from server({}): {:?}", server, err);
      }
      debug!("run_server: stopped.");
      waiter.server_stopped();
    });
  }

  // wait on main stopper
  main_stopper.wait_shutdown();

  info!("main thread: stopped.");
  Ok(())
}

fn run_server(
  config: &AppConfig,
  prefix: &str,
  db: web::Data<DbService>,
  waiter: ServerWaiter,
) -> Result<()> {
  let sys = System::new();

  let debug = config.get_bool("debug")?.unwrap_or(false);
  debug!("Debug = {:?}", debug);

  if debug {
    info!("Serve({}): store has {} articles.", prefix, db.article.len()?);
  }

  // configure services
  info!("Serve.Services: configure services. prefix={}", prefix);
  let services = config_services(config, prefix, db)?;

  // Check if stopper is enabled for this server
  let stopper = if config.get_bool(&format!("{}.stopper", prefix))?.unwrap_or_default() {
    Some(web::Data::new(waiter.clone()))
  } else {
    None
  };

  let access_log = config.get_bool(&format!("{}.access_log", prefix))?.unwrap_or(true);
  let cors = config.get_bool(&format!("{}.cors", prefix))?.unwrap_or(false);

  // Start http server
  let mut server = HttpServer::new(move || {
    let mut app = App::new()
      .wrap(middleware::Condition::new(cors, Cors::permissive()))
      .wrap(middleware::Condition::new(access_log, middleware::Logger::default()))
      .wrap(middleware::Compress::default());

    // Server stopper, registered ahead of the api scope (an empty scope matches every path).
    if let Some(ref stopper) = stopper {
      app = app.app_data(stopper.clone())
      .service(stop_server);
    }

    app.configure(|web| services.web_config(web))
  });

  // workers
  let workers = match config.get_int(&format!("{}.workers", prefix))? {
    Some(workers) if workers > 0 => workers as usize,
    Some(_) => return Err(anyhow!("{}.workers must be > 0", prefix).into()),
    None => num_cpus::get(),
  };
  info!("Workers: {}", workers);
  server = server.workers(workers);

  // listen backlog
  if let Some(backlog) = config.get_int(&format!("{}.backlog", prefix))? {
    info!("Listen backlog: {}", backlog);
    server = server.backlog(backlog.try_into()
      .map_err(|_| anyhow!("{}.backlog must be >= 0", prefix))?);
  }

  // setup binds.
  let listen = config.get_str(&format!("{}.listen", prefix))?
    .ok_or_else(|| anyhow!("Missing {}.listen", prefix))?;
  info!("{} services listening on: {}", prefix, listen);
  server = server.bind(listen)?;

  // run server future
  sys.block_on(async move {
    let server = server.run();
    let handle = server.handle();

    thread::spawn(move || {
      // wait for shutdown signal.
      match waiter.wait_shutdown() {
        Err(_) => (),
        Ok(StopEvent::StopServer) => {
          debug!("Got shutdown signal.  Stop server: {}", waiter.id);
          executor::block_on(handle.stop(true));
        },
        Ok(ev) => {
          error!("Server waiter received invalid event: {:?}", ev);
        },
      }
    });

    server.await
  })?;
  Ok(())
}
