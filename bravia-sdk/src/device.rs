//! BraviaDevice - the main entry point for controlling one device
//!
//! Provides a sync API over a registered session: power, remote commands,
//! channels, sources, volume, applications, recordings and change callbacks.

use std::sync::Arc;

use bravia_api::operations::app_control::{
    get_application_list, set_active_app, terminate_apps, Application,
    GetApplicationListOperation, SetActiveAppOperation, TerminateAppsOperation,
};
use bravia_api::operations::audio::{get_volume_information, GetVolumeInformationOperation};
use bravia_api::operations::av_content::{
    get_current_external_inputs_status, set_play_content, ExternalInput,
    GetCurrentExternalInputsStatusOperation, SetPlayContentOperation,
};
use bravia_api::operations::guide::{request_reboot, RequestRebootOperation};
use bravia_api::operations::recording::{
    get_history_list, get_recording_status, get_schedule_list, DeleteScheduleOperation,
    DeleteScheduleRequest, GetHistoryListOperation, GetRecordingStatusOperation,
    GetScheduleListOperation, HistoryItem, ScheduleItem,
};
use bravia_api::operations::system::{
    get_system_information, set_power_status, GetRemoteControllerInfoOperation,
    GetSystemInformationOperation, SetPowerStatusOperation, SystemInformation,
};
use bravia_api::{ApiError, BraviaClient, ClientIdentity, Credential, PinPrompt, Registrar};
use bravia_http::{HttpClient, HttpTransport};
use parking_lot::{Mutex, RwLock};

use crate::catalog::{Catalog, CatalogItem};
use crate::channel::channel_commands;
use crate::commands::{CommandTable, RemoteAction};
use crate::config::DeviceConfig;
use crate::error::{Result, SdkError};
use crate::events::sampler::playing_content;
use crate::events::{CallbackId, EventKind, EventLoop, LoopState, RpcSampler};
use crate::power;
use crate::speaker::{Speaker, SpeakerPosition};
use crate::volume::VolumeControl;

const POWER_ON_COMMAND: &str = "TvPower";
const POWER_OFF_COMMAND: &str = "PowerOff";

/// One Sony Bravia TV or AV receiver
///
/// Construction only validates the configuration. Call [`register`] (or use
/// [`BraviaDevice::connect`]) before anything else; until then every call
/// fails with [`SdkError::NotRegistered`].
///
/// # Example
///
/// ```rust,no_run
/// use bravia_sdk::{BraviaDevice, DeviceConfig};
///
/// let device = BraviaDevice::connect(DeviceConfig::with_psk("192.168.1.20", "0000"))?;
/// if !device.power()? {
///     device.set_power(true)?;
/// }
/// device.set_channel("4.1")?;
/// device.send_command("Mute")?;
/// # Ok::<(), bravia_sdk::SdkError>(())
/// ```
///
/// [`register`]: BraviaDevice::register
pub struct BraviaDevice {
    config: DeviceConfig,
    transport: Arc<dyn HttpTransport>,
    registrar: Registrar,

    /// Shared with the event sampler so it follows re-registration
    client: Arc<RwLock<Option<BraviaClient>>>,

    commands: RwLock<Option<Arc<CommandTable>>>,
    wol_mac: RwLock<Option<String>>,
    volume_targets: RwLock<Option<Vec<String>>>,
    applications: Mutex<Catalog<Application>>,
    inputs: Mutex<Catalog<ExternalInput>>,
    schedules: Mutex<Catalog<ScheduleItem>>,

    events: EventLoop,
    span: tracing::Span,
}

impl BraviaDevice {
    /// Create an unregistered device using an [`HttpClient`] built from the config
    pub fn new(config: DeviceConfig) -> Result<Self> {
        config.validate()?;
        let transport = Arc::new(HttpClient::with_config(config.http_config()));
        Ok(Self::build(config, transport))
    }

    /// Create an unregistered device over a custom transport
    pub fn with_transport(config: DeviceConfig, transport: Arc<dyn HttpTransport>) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config, transport))
    }

    /// Create and register in one step
    pub fn connect(config: DeviceConfig) -> Result<Self> {
        let device = Self::new(config)?;
        device.register()?;
        Ok(device)
    }

    fn build(config: DeviceConfig, transport: Arc<dyn HttpTransport>) -> Self {
        let identity = config
            .nickname
            .as_deref()
            .map(ClientIdentity::new)
            .unwrap_or_else(ClientIdentity::from_environment);
        let registrar = Registrar::new(Arc::clone(&transport), config.address.clone(), identity)
            .with_pin_timeout(config.pin_timeout);

        let span = tracing::info_span!("bravia_device", address = %config.address);
        let client = Arc::new(RwLock::new(None));
        let sampler = Arc::new(RpcSampler::new(Arc::clone(&client)));
        let events = EventLoop::new(sampler, config.poll_interval, config.stop_timeout)
            .with_span(span.clone());

        Self {
            config,
            transport,
            registrar,
            client,
            commands: RwLock::new(None),
            wol_mac: RwLock::new(None),
            volume_targets: RwLock::new(None),
            applications: Mutex::new(Catalog::new()),
            inputs: Mutex::new(Catalog::new()),
            schedules: Mutex::new(Catalog::new()),
            events,
            span,
        }
    }

    pub fn address(&self) -> &str {
        &self.config.address
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    /// Run the registration handshake and install a fresh session
    ///
    /// With a PSK this does not touch the network. Without one, and without
    /// a configured PIN, the call blocks until a PIN is submitted through
    /// [`pin_prompt`](Self::pin_prompt) or the PIN timeout expires.
    pub fn register(&self) -> Result<()> {
        let _entered = self.span.enter();
        let session = self
            .registrar
            .register(self.config.pin.as_deref(), self.config.psk.as_deref())?;

        let client = BraviaClient::with_transport(session, Arc::clone(&self.transport));
        *self.client.write() = Some(client.clone());
        self.on_registered(&client);
        Ok(())
    }

    /// Post-registration hook
    ///
    /// Everything derived from the previous session is dropped. A PIN
    /// handshake already talked to the device, so its volume control points
    /// are loaded right away; a PSK session loads them on first use and
    /// registers without any request.
    fn on_registered(&self, client: &BraviaClient) {
        *self.commands.write() = None;
        *self.volume_targets.write() = None;
        self.applications.lock().clear();
        self.inputs.lock().clear();
        self.schedules.lock().clear();
        tracing::debug!("session installed, device caches reset");

        if matches!(client.session().credential(), Credential::Cookies(_)) {
            if let Err(e) = self.load_volume_targets(client) {
                tracing::warn!(error = %e, "could not load volume control points");
            }
        }
    }

    /// Eagerly reload the volume control points and remember the MAC
    pub fn refresh(&self) -> Result<()> {
        let client = self.client()?;
        self.load_volume_targets(&client)?;
        self.remember_mac(&client);
        Ok(())
    }

    /// Handle for answering the PIN the device displays during registration
    pub fn pin_prompt(&self) -> PinPrompt {
        self.registrar.pin_prompt()
    }

    pub fn is_registered(&self) -> bool {
        self.client.read().is_some()
    }

    /// The registered client, for operations this facade does not wrap
    pub fn client(&self) -> Result<BraviaClient> {
        self.client.read().clone().ok_or(SdkError::NotRegistered)
    }

    pub fn power(&self) -> Result<bool> {
        power::is_on(&self.client()?)
    }

    /// Switch the device on or off; a no-op when it is already in that state
    ///
    /// Switching on tries the power button and `setPowerStatus` first and
    /// falls back to Wake-on-LAN when the device is still off.
    pub fn set_power(&self, on: bool) -> Result<()> {
        let client = self.client()?;
        let _entered = self.span.enter();

        let current = match power::is_on(&client) {
            Ok(current) => current,
            // Unreachable devices are treated as off so WOL can wake them.
            Err(SdkError::Api(ApiError::Send(reason))) if on => {
                tracing::debug!(%reason, "power status unavailable, assuming off");
                false
            }
            Err(e) => return Err(e),
        };
        if current == on {
            return Ok(());
        }

        if on {
            self.power_on(&client)
        } else {
            self.power_off(&client)
        }
    }

    fn power_on(&self, client: &BraviaClient) -> Result<()> {
        if let Err(e) = self.send_with(client, POWER_ON_COMMAND) {
            tracing::debug!(error = %e, "power button unavailable");
        }
        if let Err(e) = client.execute::<SetPowerStatusOperation>(&set_power_status(true)) {
            tracing::warn!(error = %e, "setPowerStatus(true) failed");
        }
        if power::is_on(client).unwrap_or(false) {
            return Ok(());
        }

        if let Err(e) = power::ensure_wol_mode(client) {
            tracing::warn!(error = %e, "could not check Wake-on-LAN mode");
        }
        let mac = self.wake_mac(client)?;
        power::send_magic_packet(&mac, self.config.wol_target()?)
    }

    fn power_off(&self, client: &BraviaClient) -> Result<()> {
        // Last chance to learn the MAC while the device still answers.
        self.remember_mac(client);

        match self.send_with(client, POWER_OFF_COMMAND) {
            Ok(()) => Ok(()),
            Err(SdkError::Command(_)) => {
                client.execute::<SetPowerStatusOperation>(&set_power_status(false))?;
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    fn remember_mac(&self, client: &BraviaClient) {
        if self.wol_mac.read().is_some() {
            return;
        }
        match power::learn_mac(client) {
            Ok(Some(mac)) => {
                tracing::debug!(%mac, "learned Wake-on-LAN MAC");
                *self.wol_mac.write() = Some(mac);
            }
            Ok(None) => tracing::debug!("device advertises no MAC address"),
            Err(e) => tracing::warn!(error = %e, "could not learn the device MAC"),
        }
    }

    fn wake_mac(&self, client: &BraviaClient) -> Result<String> {
        self.remember_mac(client);
        self.wol_mac.read().clone().ok_or_else(|| {
            SdkError::WakeOnLan(format!("no MAC address known for {}", self.config.address))
        })
    }

    /// MAC address used for Wake-on-LAN, once learned
    pub fn wol_mac(&self) -> Option<String> {
        self.wol_mac.read().clone()
    }

    /// The device's remote-controller table, fetched once per session
    pub fn commands(&self) -> Result<Arc<CommandTable>> {
        self.command_table(&self.client()?)
    }

    fn command_table(&self, client: &BraviaClient) -> Result<Arc<CommandTable>> {
        if let Some(table) = self.commands.read().as_ref() {
            return Ok(Arc::clone(table));
        }

        let table = Arc::new(CommandTable::new(
            client.execute::<GetRemoteControllerInfoOperation>(&())?,
        ));
        tracing::debug!(commands = table.len(), "loaded remote-controller table");
        *self.commands.write() = Some(Arc::clone(&table));
        Ok(table)
    }

    /// Press the remote button `name`
    pub fn send_command(&self, name: &str) -> Result<()> {
        self.send_with(&self.client()?, name)
    }

    fn send_with(&self, client: &BraviaClient, name: &str) -> Result<()> {
        let table = self.command_table(client)?;
        let code = table.resolve(name)?;
        tracing::debug!(command = name, "sending IRCC command");
        client.ircc().send(code)?;
        Ok(())
    }

    /// The remote button `name` as a bound, argument-free action
    pub fn action(&self, name: &str) -> Result<RemoteAction> {
        let client = self.client()?;
        let table = self.command_table(&client)?;
        let code = table.resolve(name)?;
        Ok(RemoteAction::new(name, code, client))
    }

    /// Every button of the remote-controller table as an action
    pub fn actions(&self) -> Result<Vec<RemoteAction>> {
        let client = self.client()?;
        let table = self.command_table(&client)?;
        Ok(table
            .names()
            .filter_map(|name| {
                table
                    .code(name)
                    .map(|code| RemoteAction::new(name, code, client.clone()))
            })
            .collect())
    }

    /// Display number of the current channel, empty when not watching TV
    pub fn channel(&self) -> Result<String> {
        Ok(playing_content(&self.client()?)?.disp_num)
    }

    /// Tune by typing `channel` on the remote, e.g. `"4.1"`
    ///
    /// Every key is resolved before anything is sent.
    pub fn set_channel(&self, channel: &str) -> Result<()> {
        let client = self.client()?;
        let table = self.command_table(&client)?;
        let codes = channel_commands(channel)?
            .into_iter()
            .map(|name| table.resolve(name))
            .collect::<Result<Vec<_>>>()?;

        let ircc = client.ircc();
        for code in codes {
            ircc.send(code)?;
        }
        Ok(())
    }

    /// Source URI of what is playing, e.g. `tv:dvbt` or `extInput:hdmi`
    pub fn source(&self) -> Result<String> {
        Ok(playing_content(&self.client()?)?.source)
    }

    /// Switch to the input matching `name` by title, URI or URI fragment
    pub fn set_source(&self, name: &str) -> Result<()> {
        let client = self.client()?;

        let cached = self.inputs.lock().find(|input| input.matches(name)).cloned();
        let input = match cached {
            Some(input) => input,
            None => self
                .load_inputs(&client)?
                .into_iter()
                .find(|input| input.matches(name))
                .ok_or_else(|| SdkError::SourceNotFound(name.to_string()))?,
        };

        tracing::debug!(uri = %input.uri, "switching input");
        client.execute::<SetPlayContentOperation>(&set_play_content(input.uri))?;
        Ok(())
    }

    /// External inputs, refreshed from the device
    pub fn inputs(&self) -> Result<Vec<ExternalInput>> {
        self.load_inputs(&self.client()?)
    }

    fn load_inputs(&self, client: &BraviaClient) -> Result<Vec<ExternalInput>> {
        let inputs = client.execute::<GetCurrentExternalInputsStatusOperation>(
            &get_current_external_inputs_status(),
        )?;
        refresh_catalog(&self.inputs, inputs.clone(), "inputs");
        Ok(inputs)
    }

    /// One handle per control point the device reports
    pub fn volume_controls(&self) -> Result<Vec<VolumeControl>> {
        let client = self.client()?;
        let targets = self.volume_targets(&client)?;
        Ok(targets
            .into_iter()
            .map(|target| VolumeControl::new(target, client.clone()))
            .collect())
    }

    /// Handle for the control point `target` (`speaker`, `headphone`...)
    pub fn volume_control(&self, target: &str) -> Result<VolumeControl> {
        let client = self.client()?;
        if !self.volume_targets(&client)?.iter().any(|t| t == target) {
            return Err(SdkError::VolumeDevice(target.to_string()));
        }
        Ok(VolumeControl::new(target, client))
    }

    fn volume_targets(&self, client: &BraviaClient) -> Result<Vec<String>> {
        if let Some(targets) = self.volume_targets.read().as_ref() {
            return Ok(targets.clone());
        }
        self.load_volume_targets(client)
    }

    fn load_volume_targets(&self, client: &BraviaClient) -> Result<Vec<String>> {
        let targets: Vec<String> = client
            .execute::<GetVolumeInformationOperation>(&get_volume_information())?
            .into_iter()
            .map(|info| info.target)
            .collect();
        // A device in standby reports nothing; do not cache that.
        if !targets.is_empty() {
            *self.volume_targets.write() = Some(targets.clone());
        }
        Ok(targets)
    }

    /// Settings handle for a receiver speaker position
    pub fn speaker<P: SpeakerPosition>(&self) -> Result<Speaker<P>> {
        Ok(Speaker::new(self.client()?))
    }

    /// Installed applications, refreshed from the device
    pub fn applications(&self) -> Result<Vec<Application>> {
        self.load_applications(&self.client()?)
    }

    fn load_applications(&self, client: &BraviaClient) -> Result<Vec<Application>> {
        let apps = client.execute::<GetApplicationListOperation>(&get_application_list())?;
        refresh_catalog(&self.applications, apps.clone(), "applications");
        Ok(apps)
    }

    /// Cached application by URI; never touches the network
    pub fn application(&self, uri: &str) -> Option<Application> {
        self.applications.lock().get(uri).cloned()
    }

    /// Launch the application whose title or URI is `name`
    pub fn launch_app(&self, name: &str) -> Result<()> {
        let client = self.client()?;
        let matches = |app: &Application| app.title == name || app.uri == name;

        let cached = self.applications.lock().find(matches).cloned();
        let app = match cached {
            Some(app) => app,
            None => self
                .load_applications(&client)?
                .into_iter()
                .find(matches)
                .ok_or_else(|| SdkError::AppNotFound(name.to_string()))?,
        };

        tracing::debug!(title = %app.title, "launching application");
        client.execute::<SetActiveAppOperation>(&set_active_app(app.uri))?;
        Ok(())
    }

    pub fn terminate_apps(&self) -> Result<()> {
        self.client()?
            .execute::<TerminateAppsOperation>(&terminate_apps())?;
        Ok(())
    }

    pub fn recording_status(&self) -> Result<String> {
        Ok(self
            .client()?
            .execute::<GetRecordingStatusOperation>(&get_recording_status())?
            .status)
    }

    /// Scheduled recordings, refreshed from the device
    pub fn schedules(&self) -> Result<Vec<ScheduleItem>> {
        self.load_schedules(&self.client()?)
    }

    fn load_schedules(&self, client: &BraviaClient) -> Result<Vec<ScheduleItem>> {
        let schedules = client.execute::<GetScheduleListOperation>(&get_schedule_list())?;
        refresh_catalog(&self.schedules, schedules.clone(), "schedules");
        Ok(schedules)
    }

    /// Schedules that overlap another one
    pub fn conflicting_schedules(&self) -> Result<Vec<ScheduleItem>> {
        Ok(self
            .schedules()?
            .into_iter()
            .filter(ScheduleItem::is_conflicting)
            .collect())
    }

    pub fn recording_history(&self) -> Result<Vec<HistoryItem>> {
        Ok(self
            .client()?
            .execute::<GetHistoryListOperation>(&get_history_list())?)
    }

    /// Delete the schedule `id`
    pub fn delete_schedule(&self, id: &str) -> Result<()> {
        let client = self.client()?;

        let cached = self.schedules.lock().get(id).cloned();
        let item = match cached {
            Some(item) => item,
            None => self
                .load_schedules(&client)?
                .into_iter()
                .find(|item| item.key() == id)
                .ok_or_else(|| SdkError::ScheduleNotFound(id.to_string()))?,
        };

        client.execute::<DeleteScheduleOperation>(&DeleteScheduleRequest::from(&item))?;
        self.load_schedules(&client)?;
        Ok(())
    }

    pub fn system_information(&self) -> Result<SystemInformation> {
        Ok(self
            .client()?
            .execute::<GetSystemInformationOperation>(&get_system_information())?)
    }

    pub fn reboot(&self) -> Result<()> {
        let _entered = self.span.enter();
        self.client()?
            .execute::<RequestRebootOperation>(&request_reboot())?;
        tracing::info!("reboot requested");
        Ok(())
    }

    /// Call `callback` for every detected state change
    ///
    /// The first callback starts background polling.
    pub fn register_callback<F>(&self, callback: F) -> Result<CallbackId>
    where
        F: Fn(EventKind) + Send + Sync + 'static,
    {
        self.client()?;
        self.events.register(Arc::new(callback))
    }

    /// Remove a callback; removing the last one stops polling
    pub fn unregister_callback(&self, id: CallbackId) -> bool {
        self.events.unregister(id)
    }

    pub fn event_state(&self) -> LoopState {
        self.events.state()
    }
}

impl std::fmt::Debug for BraviaDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BraviaDevice")
            .field("address", &self.config.address)
            .field("registered", &self.is_registered())
            .field("events", &self.events.state())
            .finish()
    }
}

fn refresh_catalog<T: CatalogItem>(catalog: &Mutex<Catalog<T>>, items: Vec<T>, name: &str) {
    let update = catalog.lock().refresh(items);
    if !update.added.is_empty() || !update.evicted.is_empty() {
        tracing::debug!(
            catalog = name,
            added = update.added.len(),
            evicted = update.evicted.len(),
            "catalog refreshed"
        );
    }
}
