// tests/property/framing_test.rs

//! Property-based tests for the length-prefixed framing
//! Tests that payloads survive arbitrary chunking and that decoding never over-reads

use bytes::{Bytes, BytesMut};
use ftserve::core::protocol::FrameCodec;
use ftserve::core::protocol::transport::{receive_frame, send_frame};
use ftserve::core::{Response, Verb};
use proptest::prelude::*;
use tokio_util::codec::{Decoder, Encoder};

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 100,
        max_shrink_iters: 1000,
        ..ProptestConfig::default()
    })]

    #[test]
    fn test_frame_survives_small_pipe(
        payload in prop::collection::vec(any::<u8>(), 0..20_000),
        pipe in 1usize..512
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let (mut writer, mut reader) = tokio::io::duplex(pipe);
            let expected = payload.clone();

            let sender = tokio::spawn(async move {
                send_frame(&mut writer, &payload).await.unwrap();
            });
            let received = receive_frame(&mut reader, 1 << 20).await.unwrap();
            sender.await.unwrap();

            assert_eq!(&received[..], &expected[..]);
        });
    }

    #[test]
    fn test_codec_decodes_arbitrary_split_points(
        frames in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..256), 1..8),
        split in 1usize..64
    ) {
        let mut codec = FrameCodec::new(1024);
        let mut wire = BytesMut::new();
        for frame in &frames {
            codec.encode(Bytes::from(frame.clone()), &mut wire).unwrap();
        }

        // Feed the encoded stream in fixed-size pieces.
        let mut buf = BytesMut::new();
        let mut decoded = Vec::new();
        for piece in wire.chunks(split) {
            buf.extend_from_slice(piece);
            while let Some(frame) = codec.decode(&mut buf).unwrap() {
                decoded.push(frame.to_vec());
            }
        }

        prop_assert!(buf.is_empty());
        prop_assert_eq!(decoded, frames);
    }

    #[test]
    fn test_declared_length_over_limit_always_rejected(
        max in 0usize..4096,
        excess in 1usize..4096
    ) {
        let mut codec = FrameCodec::new(max);
        let declared = (max + excess) as u32;
        let mut buf = BytesMut::from(&declared.to_ne_bytes()[..]);
        prop_assert!(codec.decode(&mut buf).is_err());
    }

    #[test]
    fn test_only_exact_tokens_are_known(token in prop::collection::vec(any::<u8>(), 0..8)) {
        let verb = Verb::decode(&token);
        match token.as_slice() {
            b"-l" => prop_assert_eq!(verb, Verb::List),
            b"-g" => prop_assert_eq!(verb, Verb::Get),
            _ => prop_assert!(matches!(verb, Verb::Unknown(_))),
        }
    }

    #[test]
    fn test_error_text_never_reads_as_ready(text in "[ -~]{0,64}") {
        prop_assume!(text != "DATA");
        prop_assert_eq!(
            Response::decode_control(text.as_bytes()),
            Response::Error(text.clone())
        );
    }
}
