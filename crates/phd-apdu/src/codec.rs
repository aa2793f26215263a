use crate::apdu::Apdu;

/// Errors produced while turning bytes into an `Apdu` or back.
///
/// This is not a bit-exact ASN.1/MDER implementation — that remains an
/// external collaborator per the engine's scope (see DESIGN.md) — but a
/// real, round-trippable codec the engine and its tests can depend on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApduCodecError {
    Decode(String),
}

impl std::fmt::Display for ApduCodecError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApduCodecError::Decode(msg) => write!(f, "apdu decode failed: {}", msg),
        }
    }
}

impl std::error::Error for ApduCodecError {}

pub trait Codec {
    fn encode_apdu(&self, apdu: &Apdu) -> Result<Vec<u8>, ApduCodecError>;
    fn decode_apdu(&self, bytes: &[u8]) -> Result<Apdu, ApduCodecError>;
}

/// `bitcode`-backed codec. Not MDER, but a real, tested wire format suitable
/// for loopback and TCP transports where both ends run this engine.
#[derive(Debug, Default, Clone, Copy)]
pub struct BitcodeCodec;

impl Codec for BitcodeCodec {
    fn encode_apdu(&self, apdu: &Apdu) -> Result<Vec<u8>, ApduCodecError> {
        Ok(bitcode::encode(apdu))
    }

    fn decode_apdu(&self, bytes: &[u8]) -> Result<Apdu, ApduCodecError> {
        bitcode::decode(bytes).map_err(|e| ApduCodecError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apdu::*;
    use crate::consts::*;

    #[test]
    fn roundtrips_aarq() {
        let codec = BitcodeCodec;
        let mut config = default_association_information();
        config.system_type = SYS_TYPE_AGENT;
        config.system_id = vec![1, 2, 3, 4, 5, 6, 7, 8];
        config.dev_config_id = 42;
        config.data_req_mode_flags = DATA_REQ_SUPP_INIT_AGENT;
        config.data_req_init_agent_count = 1;

        let original = Apdu::Aarq(AssociationRequest { assoc_version: ASSOC_VERSION1, data_proto_id: DATA_PROTO_ID_20601, config });

        let encoded = codec.encode_apdu(&original).unwrap();
        let decoded = codec.decode_apdu(&encoded).unwrap();

        assert_eq!(decoded, original);
        match decoded {
            Apdu::Aarq(req) => {
                assert_eq!(req.config.dev_config_id, 42);
                assert_eq!(req.config.system_id, vec![1, 2, 3, 4, 5, 6, 7, 8]);
            }
            _ => panic!("wrong apdu kind decoded"),
        }
    }

    #[test]
    fn roundtrips_prst_confirmed_event_report() {
        let codec = BitcodeCodec;
        let original = Apdu::Prst(Presentation {
            data: DataApdu::Roiv {
                invoke_id: 7,
                choice: RoivChoice::ConfirmedEventReport(EventReportArgumentSimple {
                    obj_handle: MDS_HANDLE,
                    event_time: 0xFFFF_FFFF,
                    event_type: EventType::NotiConfig,
                    event_info: EventInfo::Config(ConfigReport {
                        config_report_id: 9,
                        config_object_list: ConfigObjectList { objects: vec![ConfigObject { obj_class: 1, obj_handle: 2, attributes: vec![0xaa, 0xbb] }] },
                    }),
                }),
            },
        });

        let encoded = codec.encode_apdu(&original).unwrap();
        let decoded = codec.decode_apdu(&encoded).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn decode_of_garbage_bytes_fails() {
        let codec = BitcodeCodec;
        let err = codec.decode_apdu(&[0xff; 3]).unwrap_err();
        matches!(err, ApduCodecError::Decode(_));
    }
}
