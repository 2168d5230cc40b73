//! `VehicleSignalsPort` over gRPC.
//!
//! Both service clients share one `Channel`. Cloning a generated client is
//! cheap and every call works on its own clone, so the adapter is `Sync`
//! without locking.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use futures::StreamExt;
use tonic::transport::{Channel, Endpoint};
use tonic::{Code, Status};

use super::proto::lighting::lighting_service_client::LightingServiceClient;
use super::proto::lighting::{GetHeadlightStateRequest, SetHeadlightRequest};
use super::proto::obd::obd_service_client::ObdServiceClient;
use super::proto::obd::{FuelLevelRequest, FuelLevelResponse, FuelLevelStreamRequest};
use super::status::BackendStatus;
use crate::application::ports::{
    FuelReadingStream, SignalError, SignalOperation, VehicleSignalsPort,
};
use crate::domain::vehicle::{FuelReading, HeadlightCommand, HeadlightState, VehicleId};
use crate::infrastructure::metrics;

/// gRPC implementation of [`VehicleSignalsPort`].
#[derive(Debug, Clone)]
pub struct GrpcVehicleSignals {
    obd: ObdServiceClient<Channel>,
    lighting: LightingServiceClient<Channel>,
    unary_timeout: Duration,
    status: Arc<BackendStatus>,
}

impl GrpcVehicleSignals {
    /// Build the adapter over an existing channel.
    #[must_use]
    pub fn new(channel: Channel, unary_timeout: Duration, status: Arc<BackendStatus>) -> Self {
        Self {
            obd: ObdServiceClient::new(channel.clone()),
            lighting: LightingServiceClient::new(channel),
            unary_timeout,
            status,
        }
    }

    /// Build the adapter over a channel that connects on first use.
    ///
    /// Startup does not wait for the backend. Connection failures surface
    /// as `SignalError::Unavailable` on the calls that hit them.
    ///
    /// # Errors
    ///
    /// Returns an error if `endpoint` is not a valid URI.
    pub fn connect_lazy(
        endpoint: &str,
        unary_timeout: Duration,
        status: Arc<BackendStatus>,
    ) -> Result<Self, tonic::transport::Error> {
        let channel = Endpoint::from_shared(endpoint.to_string())?.connect_lazy();
        Ok(Self::new(channel, unary_timeout, status))
    }

    fn request<T>(&self, message: T) -> tonic::Request<T> {
        let mut request = tonic::Request::new(message);
        request.set_timeout(self.unary_timeout);
        request
    }

    async fn unary<T, F>(&self, operation: SignalOperation, call: F) -> Result<T, SignalError>
    where
        F: Future<Output = Result<tonic::Response<T>, Status>>,
    {
        let started = Instant::now();
        let result = match tokio::time::timeout(self.unary_timeout, call).await {
            Ok(Ok(response)) => Ok(response.into_inner()),
            Ok(Err(status)) => Err(map_status(operation, &status)),
            Err(_) => Err(SignalError::timeout(operation, self.unary_timeout)),
        };

        metrics::record_backend_call(operation, started.elapsed(), result.is_err());
        self.status.record(&result);
        if let Err(e) = &result {
            tracing::warn!(operation = operation.as_str(), error = %e, "Backend call failed");
        }
        result
    }
}

#[async_trait]
impl VehicleSignalsPort for GrpcVehicleSignals {
    async fn get_fuel_level(&self, vehicle_id: &VehicleId) -> Result<FuelReading, SignalError> {
        let mut client = self.obd.clone();
        let request = self.request(FuelLevelRequest {
            vehicle_id: vehicle_id.to_string(),
        });
        let response = self
            .unary(SignalOperation::GetFuelLevel, client.get_fuel_level(request))
            .await?;
        Ok(to_reading(&response))
    }

    async fn open_fuel_stream(
        &self,
        vehicle_id: &VehicleId,
        interval_secs: u32,
    ) -> Result<FuelReadingStream, SignalError> {
        let operation = SignalOperation::StreamFuelLevel;
        let mut client = self.obd.clone();
        let request = tonic::Request::new(FuelLevelStreamRequest {
            vehicle_id: vehicle_id.to_string(),
            interval_seconds: interval_secs,
        });

        let started = Instant::now();
        let result = client
            .stream_fuel_level(request)
            .await
            .map_err(|status| map_status(operation, &status));
        metrics::record_backend_call(operation, started.elapsed(), result.is_err());
        self.status.record(&result);

        let status = Arc::clone(&self.status);
        let readings = result?.into_inner().map(move |item| {
            item.map(|response| to_reading(&response)).map_err(|e| {
                let error = map_status(operation, &e);
                status.record_failure(&error);
                error
            })
        });
        Ok(Box::pin(readings))
    }

    async fn get_headlight_state(
        &self,
        _vehicle_id: &VehicleId,
    ) -> Result<HeadlightState, SignalError> {
        let mut client = self.lighting.clone();
        let request = self.request(GetHeadlightStateRequest {});
        let response = self
            .unary(
                SignalOperation::GetHeadlightState,
                client.get_headlight_state(request),
            )
            .await?;
        Ok(HeadlightState {
            headlight_on: response.is_on,
        })
    }

    async fn set_headlight(
        &self,
        _vehicle_id: &VehicleId,
        command: HeadlightCommand,
    ) -> Result<bool, SignalError> {
        let mut client = self.lighting.clone();
        let request = self.request(SetHeadlightRequest {
            turn_on: command.turn_on,
        });
        let response = self
            .unary(SignalOperation::SetHeadlight, client.set_headlight(request))
            .await?;
        Ok(response.success)
    }
}

const fn to_reading(response: &FuelLevelResponse) -> FuelReading {
    FuelReading::new(
        response.level_percent,
        response.timestamp_ms,
        response.status,
    )
}

fn map_status(operation: SignalOperation, status: &Status) -> SignalError {
    match status.code() {
        Code::Unavailable => SignalError::Unavailable {
            operation,
            message: status.message().to_string(),
        },
        code => SignalError::Rpc {
            operation,
            code: format!("{code:?}"),
            message: status.message().to_string(),
        },
    }
}
