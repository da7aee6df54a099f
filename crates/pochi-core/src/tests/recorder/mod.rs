mod recorder_session;
